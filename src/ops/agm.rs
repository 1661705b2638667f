//! Arithmetic-geometric mean.

use crate::defs::Error;
use crate::defs::INFINITE;
use crate::num::Apfloat;
use crate::ops::util::ensure_precision;
use crate::ops::util::extend_precision;

// Agreement threshold, in digits, below which convergence is still linear.
const CONVERGING: u64 = 1000;

/// Arithmetic-geometric mean of `a` and `b`: the common limit of
/// `a' = (a+b)/2, b' = sqrt(a*b)`. Zero arguments yield zero, as the
/// iteration would not converge quadratically.
///
/// ## Errors
///
///  - InfinitePrecision: both arguments have infinite precision.
///  - Domain: the arguments have opposite signs.
pub fn agm(a: &Apfloat, b: &Apfloat) -> Result<Apfloat, Error> {
    if a.is_zero() || b.is_zero() {
        return Apfloat::zero(a.radix());
    }

    let working = a.precision().min(b.precision());
    let target = a.precision().max(b.precision());

    if working == INFINITE {
        return Err(Error::InfinitePrecision("agm"));
    }

    // some extra precision is required for the iteration to stay accurate
    let working = extend_precision(working);
    let mut a = ensure_precision(a, working);
    let mut b = ensure_precision(b, working);

    let half_working = (working + 1) / 2;
    let two = Apfloat::from_i64(2, INFINITE, a.radix())?;
    let mut precision = 0u64;

    // until the values share digits the agreement grows only linearly
    while precision < CONVERGING && precision < half_working {
        let t = a.add(&b)?.div(&two)?;
        b = a.mul(&b)?.sqrt()?;
        a = t;

        // absorb accumulating round-off
        a = ensure_precision(&a, working);
        b = ensure_precision(&b, working);

        precision = a.equal_digits(&b);
    }

    // now agreement doubles every round
    while precision <= half_working {
        let t = a.add(&b)?.div(&two)?;
        b = a.mul(&b)?.sqrt()?;
        a = t;

        a = ensure_precision(&a, working);
        b = ensure_precision(&b, working);

        precision = precision.saturating_mul(2).max(1);
    }

    Ok(a.add(&b)?.div(&two)?.with_precision(target))
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_agm() {
        let p = 20;
        let one = Apfloat::from_i64(1, p, 10).unwrap();
        let two = Apfloat::from_i64(2, p, 10).unwrap();

        let r = agm(&one, &two).unwrap();
        let refv = Apfloat::parse("1.4567910310469068691", p, 10).unwrap();
        assert!(r.equal_digits(&refv) >= p - 2);

        // symmetry, and the mean lies between the arguments
        let r2 = agm(&two, &one).unwrap();
        assert!(r.equal_digits(&r2) >= p - 2);
        assert!(r.cmp_to(&one) == core::cmp::Ordering::Greater);
        assert!(r.cmp_to(&two) == core::cmp::Ordering::Less);

        // agm(x, x) == x
        let x = Apfloat::parse("3.25", 30, 10).unwrap();
        let r = agm(&x, &x).unwrap();
        assert!(r.equal_digits(&x) >= 28);

        assert!(agm(&one, &Apfloat::zero(10).unwrap()).unwrap().is_zero());
        assert!(agm(&one.with_precision(INFINITE), &two.with_precision(INFINITE)).is_err());
    }

    #[test]
    fn test_agm_small_argument() {
        // widely separated magnitudes converge through the linear phase
        let p = 30;
        let one = Apfloat::from_i64(1, p, 10).unwrap();
        let e = Apfloat::parse("1e-20", p, 10).unwrap();

        let r = agm(&one, &e).unwrap();
        assert_eq!(r.signum(), 1);
        assert!(r.cmp_to(&one) == core::cmp::Ordering::Less);
        assert!(r.cmp_to(&e) == core::cmp::Ordering::Greater);
    }
}
