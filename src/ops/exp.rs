//! Exponent function by Newton's iteration for the inverse of the logarithm.

use core::cmp::Ordering;

use crate::defs::double_precision;
use crate::defs::if_finite;
use crate::defs::Error;
use crate::defs::EXTRA_PRECISION;
use crate::defs::INFINITE;
use crate::num::Apfloat;
use crate::ops::log::log_radix;
use crate::ops::other::scale;
use crate::ops::util::extended;
use crate::ops::util::newton_plan;

// Extend the iterate and the correction on the final round, so that the last
// digits of the result reflect a converged value.
fn extend_on_last(iterations: u32, precising: i64, v: &Apfloat) -> Apfloat {
    if iterations == 0 && precising != 0 {
        extended(v)
    } else {
        v.clone()
    }
}

impl Apfloat {
    /// Exponent function, `e^self`.
    ///
    /// ## Errors
    ///
    ///  - InfinitePrecision: the precision is infinite.
    ///  - Overflow: the result does not fit the representable exponent range.
    pub fn exp(&self) -> Result<Self, Error> {
        let radix = self.radix();

        if self.is_zero() {
            return Apfloat::one(radix);
        }

        let double_prec = double_precision(radix);

        // an argument close to zero gives a more accurate result
        let boost = 1i64.saturating_sub(self.scale()).max(0) as u64;
        let target = if_finite(
            self.precision(),
            self.precision().saturating_add(boost).min(INFINITE - 1),
        );

        if target == INFINITE {
            return Err(Error::InfinitePrecision("exponent"));
        }

        let limit = Apfloat::from_f64(i64::MAX as f64 * (radix as f64).ln(), double_prec, radix)?;
        if self.cmp_to(&limit) != Ordering::Less {
            return Err(Error::Overflow);
        }

        if self.scale() <= i64::MIN / 2 + EXTRA_PRECISION as i64 {
            // Taylor series: exp(x) = 1 + x + x^2/2 + ...
            return Apfloat::one(radix)?.add(self);
        }

        let (mut result, mut precision);

        if self.scale() < -(double_prec as i64) / 2 {
            // Taylor series: exp(x) = 1 + x + x^2/2 + ...
            precision = (-2 * self.scale()) as u64;
            result = Apfloat::from_i64(1, precision, radix)?.add(self)?;
        } else {
            // seed y = radix^(x/ln(radix)) from the native floating point value,
            // split into integer and fractional parts of the exponent
            let v = self.to_f64() / (radix as f64).ln();
            let ip = v.floor();
            let fp = v - ip;

            result = Apfloat::from_f64((radix as f64).powf(fp), double_prec, radix)?;
            result = scale(&result, ip as i64)?;

            // a large integer part eats into the seed's digits
            let ip_digits = if ip > 0.0 {
                ((ip + 0.5).ln() / (radix as f64).ln()).floor() as u64
            } else {
                0
            };
            precision = double_prec.saturating_sub(ip_digits).max(1);
        }

        // warm the radix logarithm once, so the iteration's log calls hit the cache
        log_radix(target, radix)?;

        let plan = newton_plan(precision, target);
        let mut iterations = plan.iterations;
        let precising = plan.precising;

        let x = extended(self);

        // y <- y + y*(x - log(y))
        while iterations > 0 {
            iterations -= 1;

            precision = precision.saturating_mul(2);
            result = result.with_precision(precision.min(target));

            let t = result.ln()?;
            let t = extend_on_last(iterations, precising as i64, &t);
            let mut t = x.sub(&t)?;

            if iterations < precising {
                t = t.with_precision((precision / 2).max(1));
            }

            result = extend_on_last(iterations, precising as i64, &result);
            result = result.add(&result.mul(&t)?)?;

            if iterations == precising {
                let t = result.ln()?;
                let t = extend_on_last(iterations, -1, &t);

                result = extend_on_last(iterations, -1, &result);
                result = result.add(&result.mul(&x.sub(&t)?)?)?;
            }
        }

        Ok(result.with_precision(target))
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_exp() {
        let p = 30;
        let one = Apfloat::from_i64(1, p, 10).unwrap();
        let r = one.exp().unwrap();
        let refv = Apfloat::parse("2.71828182845904523536028747135", p, 10).unwrap();
        assert!(r.equal_digits(&refv) >= p - 2);

        assert_eq!(
            Apfloat::zero(10).unwrap().exp().unwrap(),
            Apfloat::one(10).unwrap()
        );

        // negative argument
        let r = one.neg().exp().unwrap();
        let refv = Apfloat::parse("0.367879441171442321595523770161", p, 10).unwrap();
        assert!(r.equal_digits(&refv) >= p - 2);

        assert!(Apfloat::from_i64(1, INFINITE, 10).unwrap().exp().is_err());
    }

    #[test]
    fn test_exp_log_round_trip() {
        let p = 30;
        let x = Apfloat::parse("3.25", p, 10).unwrap();
        let r = x.ln().unwrap().exp().unwrap();
        assert!(r.equal_digits(&x) >= p - 3);

        let r = x.exp().unwrap().ln().unwrap();
        assert!(r.equal_digits(&x) >= p - 3);
    }

    #[test]
    fn test_exp_addition_formula() {
        // exp(x+y) == exp(x)*exp(y)
        let p = 25;
        let x = Apfloat::parse("1.5", p, 10).unwrap();
        let y = Apfloat::parse("2.25", p, 10).unwrap();

        let a = x.add(&y).unwrap().exp().unwrap();
        let b = x.exp().unwrap().mul(&y.exp().unwrap()).unwrap();
        assert!(a.equal_digits(&b) >= p - 3);
    }

    #[test]
    fn test_exp_large_argument() {
        let p = 20;
        let x = Apfloat::from_i64(100, p, 10).unwrap();
        let r = x.exp().unwrap();

        // e^100 = 2.6881171418161354484e43
        assert_eq!(r.scale(), 44);
        let refv = Apfloat::parse("2.6881171418161354484e43", p, 10).unwrap();
        assert!(r.equal_digits(&refv) >= p - 3);
    }

    #[test]
    fn test_exp_small_argument() {
        // the Taylor shortcut answers tiny arguments
        let p = 20;
        let x = Apfloat::parse("1e-30", p, 10).unwrap();
        let r = x.exp().unwrap();

        let one = Apfloat::one(10).unwrap();
        let d = r.sub(&one).unwrap();
        assert!(d.equal_digits(&x) >= p - 2);
    }

    #[test]
    fn test_exp_overflow() {
        let x = Apfloat::parse("5e20", 20, 10).unwrap();
        assert_eq!(x.exp().unwrap_err(), Error::Overflow);
    }
}
