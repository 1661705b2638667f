//! Scaling, remainders, and fused multiply-add.

use core::cmp::Ordering;

use crate::defs::if_finite;
use crate::defs::Error;
use crate::defs::EXTRA_PRECISION;
use crate::defs::INFINITE;
use crate::num::Apfloat;
use crate::ops::util::matching_precisions;

/// Multiplies `x` by `radix^k`.
///
/// ## Errors
///
///  - Overflow: the result exponent is outside the representable range.
pub fn scale(x: &Apfloat, k: i64) -> Result<Apfloat, Error> {
    if k == 0 || x.is_zero() {
        return Ok(x.clone());
    }

    let radix = Apfloat::from_i64(x.radix() as i64, INFINITE, x.radix())?;

    if k.unsigned_abs() & (3 << 62) != 0 {
        // near the extremes of the range the scaler itself could overflow;
        // split it in two and apply a parity correction
        let s1 = radix.powi((k.unsigned_abs() >> 1) as i64)?;
        let s2 = if k & 1 == 0 { s1.clone() } else { s1.mul(&radix)? };

        if k >= 0 {
            x.mul(&s1)?.mul(&s2)
        } else {
            x.div(&s1)?.div(&s2)
        }
    } else if x.radix() <= 14 {
        let s = Apfloat::parse(&format!("1e{}", k), INFINITE, x.radix())?;
        x.mul(&s)
    } else {
        // "e" would be a digit of the radix
        let s = radix.powi(k.unsigned_abs() as i64)?;

        if k >= 0 {
            x.mul(&s)
        } else {
            x.div(&s)
        }
    }
}

/// Fused multiply-add, `a*b + c*d`, with the products computed only to the
/// precision that survives the final addition.
///
/// ## Errors
///
///  - Overflow: a result exponent is outside the representable range.
pub fn multiply_add(a: &Apfloat, b: &Apfloat, c: &Apfloat, d: &Apfloat) -> Result<Apfloat, Error> {
    multiply_add_or_subtract(a, b, c, d, false)
}

/// Fused multiply-subtract, `a*b - c*d`, with the products computed only to
/// the precision that survives the final subtraction.
///
/// ## Errors
///
///  - Overflow: a result exponent is outside the representable range.
pub fn multiply_subtract(
    a: &Apfloat,
    b: &Apfloat,
    c: &Apfloat,
    d: &Apfloat,
) -> Result<Apfloat, Error> {
    multiply_add_or_subtract(a, b, c, d, true)
}

fn multiply_add_or_subtract(
    a: &Apfloat,
    b: &Apfloat,
    c: &Apfloat,
    d: &Apfloat,
    subtract: bool,
) -> Result<Apfloat, Error> {
    let mp = matching_precisions(a, b, c, d);

    let ab = if mp.ab == 0 {
        Apfloat::zero(a.radix())?
    } else {
        a.with_precision(mp.ab).mul(&b.with_precision(mp.ab))?
    };

    let cd = if mp.cd == 0 {
        Apfloat::zero(a.radix())?
    } else {
        c.with_precision(mp.cd).mul(&d.with_precision(mp.cd))?
    };

    let r = if subtract { ab.sub(&cd)? } else { ab.add(&cd)? };

    Ok(if r.is_zero() {
        r
    } else {
        r.with_precision(mp.result)
    })
}

impl Apfloat {
    /// Splits the value into an integer part and a fractional part in `[0, 1)`.
    ///
    /// ## Errors
    ///
    ///  - Overflow: the subtraction exponent is outside the representable range.
    pub fn modf(&self) -> Result<(Self, Self), Error> {
        let i = self.floor();
        let f = self.sub(&i)?;

        Ok((i, f))
    }

    /// Remainder of `self / y`: the result shares the sign of `self` and its
    /// magnitude is below `|y|`. Zero divisor returns zero by convention.
    ///
    /// ## Errors
    ///
    ///  - Overflow: an intermediate exponent is outside the representable range.
    pub fn fmod(&self, y: &Self) -> Result<Self, Error> {
        if y.is_zero() {
            return Ok(y.clone()); // by definition
        }
        if self.is_zero() {
            return Ok(self.clone());
        }

        let b = y.abs();
        if self.abs().cmp_to(&b) == Ordering::Less {
            return Ok(self.clone());
        }

        let sdiff = (self.scale() - y.scale()) as u64;
        if self.precision() <= sdiff {
            // not enough digits to tell the quotient from noise
            return Apfloat::zero(self.radix());
        }

        // approximate quotient at just enough precision
        let precision = sdiff + EXTRA_PRECISION;
        let q = self
            .with_precision(precision)
            .div(&y.with_precision(precision))?
            .truncate();

        let precision = if_finite(y.precision(), y.precision().saturating_add(sdiff)).min(self.precision());
        let tx = self.with_precision(precision);
        let ty = y.with_precision(precision);
        let mut t = tx.sub(&q.mul(&ty)?)?;

        // a round-off slip in the quotient can leave the remainder past the
        // divisor; pull it back until it fits
        while !t.is_zero() && t.abs().cmp_to(&b) != Ordering::Less {
            let sign = Apfloat::from_i64(self.signum() as i64, INFINITE, self.radix())?;
            t = sign.mul(&t.abs().sub(&b)?)?;
        }

        Ok(t)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_scale() {
        let x = Apfloat::from_i64(3, 10, 10).unwrap();
        assert_eq!(scale(&x, 4).unwrap(), Apfloat::from_i64(30000, 10, 10).unwrap());
        assert_eq!(scale(&x, -2).unwrap(), Apfloat::parse("0.03", 10, 10).unwrap());
        assert_eq!(scale(&x, 0).unwrap(), x);

        // scale(x, a+b) == scale(scale(x, a), b)
        let a = scale(&x, 7).unwrap();
        assert_eq!(scale(&a, -12).unwrap(), scale(&x, -5).unwrap());

        // radixes where "e" is a digit
        let x = Apfloat::from_i64(10, 10, 16).unwrap();
        let r = scale(&x, 3).unwrap();
        assert_eq!(r, Apfloat::parse("a000", 10, 16).unwrap());
        let r = scale(&x, -1).unwrap();
        assert_eq!(r, Apfloat::parse("0.a", 10, 16).unwrap());

        // exact values stay exact through scaling
        let x = Apfloat::one(2).unwrap();
        let r = scale(&x, -80).unwrap();
        assert_eq!(r.precision(), INFINITE);
        assert_eq!(r.scale(), -79);
    }

    #[test]
    fn test_fmod() {
        let ten = Apfloat::from_i64(10, 20, 10).unwrap();
        let three = Apfloat::from_i64(3, 20, 10).unwrap();
        assert_eq!(ten.fmod(&three).unwrap(), Apfloat::one(10).unwrap());
        assert_eq!(ten.neg().fmod(&three).unwrap(), Apfloat::from_i64(-1, 20, 10).unwrap());

        // zero divisor returns zero
        let five = Apfloat::from_i64(5, 20, 10).unwrap();
        assert!(five.fmod(&Apfloat::zero(10).unwrap()).unwrap().is_zero());

        // |x| < |y| returns x
        assert_eq!(three.fmod(&ten).unwrap(), three);

        // x = floor(x/y)*y + fmod(x, y)
        let x = Apfloat::parse("123.625", 25, 10).unwrap();
        let y = Apfloat::parse("7.25", 25, 10).unwrap();
        let r = x.fmod(&y).unwrap();
        let q = x.div(&y).unwrap().truncate();
        assert_eq!(q.mul(&y).unwrap().add(&r).unwrap(), x);
        assert_eq!(r.signum(), 1);
        assert_eq!(r.abs().cmp_to(&y), Ordering::Less);
    }

    #[test]
    fn test_modf() {
        let x = Apfloat::parse("3.75", 20, 10).unwrap();
        let (i, f) = x.modf().unwrap();
        assert_eq!(i, Apfloat::from_i64(3, INFINITE, 10).unwrap());
        assert_eq!(f, Apfloat::parse("0.75", 20, 10).unwrap());

        // fractional part stays in [0, 1) for negative values
        let (i, f) = x.neg().modf().unwrap();
        assert_eq!(i, Apfloat::from_i64(-4, INFINITE, 10).unwrap());
        assert_eq!(f, Apfloat::parse("0.25", 20, 10).unwrap());
    }

    #[test]
    fn test_multiply_add() {
        let a = Apfloat::from_i64(3, 20, 10).unwrap();
        let b = Apfloat::from_i64(5, 20, 10).unwrap();
        let c = Apfloat::from_i64(7, 20, 10).unwrap();
        let d = Apfloat::from_i64(11, 20, 10).unwrap();

        let r = multiply_add(&a, &b, &c, &d).unwrap();
        assert_eq!(r, Apfloat::from_i64(92, 20, 10).unwrap());

        let r = multiply_subtract(&a, &b, &c, &d).unwrap();
        assert_eq!(r, Apfloat::from_i64(-62, 20, 10).unwrap());

        // cancellation to exact zero
        let r = multiply_subtract(&a, &b, &b, &a).unwrap();
        assert!(r.is_zero());

        // a negligible product collapses to zero
        let tiny = Apfloat::parse("1e-100", 10, 10).unwrap();
        let r = multiply_add(&a, &b, &tiny, &tiny).unwrap();
        assert_eq!(r, Apfloat::from_i64(15, 20, 10).unwrap());
    }
}
