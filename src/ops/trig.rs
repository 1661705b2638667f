//! Trigonometric functions, computed through the complex exponent and logarithm.

use crate::defs::Error;
use crate::defs::INFINITE;
use crate::num::Apfloat;
use crate::ops::complex::Apcomplex;
use crate::ops::other::scale;
use crate::ops::pi::pi_radix;

// exp(i*x)
fn exp_i(x: &Apfloat) -> Result<Apcomplex, Error> {
    Apcomplex::new(Apfloat::zero(x.radix())?, x.clone()).exp()
}

impl Apfloat {
    /// Cosine, the real part of `exp(i*self)`.
    ///
    /// ## Errors
    ///
    ///  - InfinitePrecision: the precision is infinite.
    pub fn cos(&self) -> Result<Self, Error> {
        Ok(exp_i(self)?.real().clone())
    }

    /// Sine, the imaginary part of `exp(i*self)`.
    ///
    /// ## Errors
    ///
    ///  - InfinitePrecision: the precision is infinite.
    pub fn sin(&self) -> Result<Self, Error> {
        Ok(exp_i(self)?.imag().clone())
    }

    /// Tangent.
    ///
    /// ## Errors
    ///
    ///  - InfinitePrecision: the precision is infinite.
    ///  - DivisionByZero: the argument is a pole of the tangent.
    pub fn tan(&self) -> Result<Self, Error> {
        let w = exp_i(self)?;

        w.imag().div(w.real())
    }

    /// Inverse sine.
    ///
    /// ## Errors
    ///
    ///  - Domain: the argument is outside [-1, 1].
    ///  - InfinitePrecision: the precision is infinite.
    pub fn asin(&self) -> Result<Self, Error> {
        let one = Apfloat::one(self.radix())?;

        // asin(x) = -Im(log(sqrt(1 - x^2) - i*x))
        let t = one.sub(&self.mul(self)?)?.sqrt()?;
        let z = Apcomplex::new(t, self.neg());

        Ok(z.log()?.imag().neg())
    }

    /// Inverse cosine.
    ///
    /// ## Errors
    ///
    ///  - Domain: the argument is outside [-1, 1].
    ///  - InfinitePrecision: the precision is infinite.
    pub fn acos(&self) -> Result<Self, Error> {
        let one = Apfloat::one(self.radix())?;

        // acos(x) = Im(log(x + i*sqrt(1 - x^2)))
        let t = one.sub(&self.mul(self)?)?.sqrt()?;
        let z = Apcomplex::new(self.clone(), t);

        Ok(z.log()?.imag().clone())
    }

    /// Inverse tangent.
    ///
    /// ## Errors
    ///
    ///  - InfinitePrecision: the precision is infinite.
    pub fn atan(&self) -> Result<Self, Error> {
        let radix = self.radix();
        let one = Apfloat::one(radix)?;
        let two = Apfloat::from_i64(2, INFINITE, radix)?;

        // atan(x) = Im(log((i - x)/(i + x))) / 2
        let a = Apcomplex::new(self.neg(), one.clone());
        let b = Apcomplex::new(self.clone(), one);

        a.div(&b)?.log()?.imag().div(&two)
    }
}

/// The angle of the point `(y, x)` in the plane, in (-π, π].
///
/// ## Errors
///
///  - Domain: both arguments are zero.
///  - InfinitePrecision: both precisions are infinite.
pub fn atan2(x: &Apfloat, y: &Apfloat) -> Result<Apfloat, Error> {
    let radix = x.radix();

    if y.is_zero() {
        if x.is_zero() {
            return Err(Error::Domain("angle of (0, 0)"));
        }

        let pi = pi_radix(x.precision(), radix)?;
        let two = Apfloat::from_i64(2, INFINITE, radix)?;

        return Apfloat::from_i64(x.signum() as i64, INFINITE, radix)?
            .mul(&pi)?
            .div(&two);
    }

    if x.is_zero() {
        if y.signum() > 0 {
            return Apfloat::zero(radix);
        }

        return pi_radix(y.precision(), radix);
    }

    if x.precision().min(y.precision()) == INFINITE {
        return Err(Error::InfinitePrecision("atan2"));
    }

    // rescale to keep the magnitudes representable
    let max_scale = x.scale().max(y.scale());
    let x = scale(x, -max_scale)?;
    let y = scale(y, -max_scale)?;

    Ok(Apcomplex::new(y, x).log()?.imag().clone())
}
