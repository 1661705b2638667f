//! Integer and arbitrary powers.

use crate::defs::if_finite;
use crate::defs::Error;
use crate::defs::INFINITE;
use crate::num::Apfloat;
use crate::ops::log::log_radix;
use crate::ops::util::extended;

impl Apfloat {
    /// Integer power by binary exponentiation.
    ///
    /// ## Errors
    ///
    ///  - Domain: both the base and the exponent are zero.
    ///  - InfinitePrecision: `n` is negative and the precision is infinite.
    pub fn powi(&self, n: i64) -> Result<Self, Error> {
        if n == 0 {
            if self.is_zero() {
                return Err(Error::Domain("zero to power zero"));
            }

            return Apfloat::one(self.radix());
        }

        let mut x = self.clone();
        let mut n = if n < 0 {
            x = x.inverse_root(1)?;
            n.unsigned_abs()
        } else {
            n as u64
        };

        // square out the trailing zero bits before accumulating
        while n & 1 == 0 {
            x = x.mul(&x)?;
            n >>= 1;
        }

        let mut r = x.clone();

        loop {
            n >>= 1;
            if n == 0 {
                break;
            }

            x = x.mul(&x)?;
            if n & 1 != 0 {
                r = r.mul(&x)?;
            }
        }

        Ok(r)
    }

    /// Arbitrary power, `self^y`, computed as `exp(y*ln(self))`.
    ///
    /// Negative bases are rejected even for integer exponents; use
    /// [`powi`](Self::powi) for those.
    ///
    /// ## Errors
    ///
    ///  - Domain: both base and exponent are zero, or the base is negative.
    ///  - InfinitePrecision: both operands have infinite precision.
    pub fn pow(&self, y: &Self) -> Result<Self, Error> {
        if y.is_zero() {
            if self.is_zero() {
                return Err(Error::Domain("zero to power zero"));
            }

            return Apfloat::one(self.radix());
        } else if self.is_zero() || self.is_one() || y.is_one() {
            return Ok(self.clone());
        } else if self.signum() < 0 {
            return Err(Error::Domain("power of negative base; result would be complex"));
        }

        let mut target = self.precision().min(y.precision());
        if target == INFINITE {
            return Err(Error::InfinitePrecision("pow"));
        }

        // precalculate the needed values just once to the required precision;
        // this may not work too efficiently if the base is close to 1
        log_radix(target, self.radix())?;

        // a base close to 1 makes the logarithm less accurate
        let one = Apfloat::one(self.radix())?;
        target = if_finite(target, target.saturating_add(one.equal_digits(self)));
        let x = self.with_precision(self.precision().min(target));

        let r = x.ln()?;
        let intermediate = y.precision().min(r.precision());
        let r = extended(&r);
        let r = extended(y).mul(&r)?;

        r.with_precision(intermediate).exp()
    }
}
