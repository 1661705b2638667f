//! Hyperbolic functions and their inverses, computed through the exponent and
//! the logarithm.

use crate::defs::Error;
use crate::defs::INFINITE;
use crate::num::Apfloat;

impl Apfloat {
    /// Hyperbolic cosine, `(e^x + e^-x)/2`.
    ///
    /// ## Errors
    ///
    ///  - InfinitePrecision: the precision is infinite.
    ///  - Overflow: the result does not fit the representable exponent range.
    pub fn cosh(&self) -> Result<Self, Error> {
        let radix = self.radix();
        let one = Apfloat::one(radix)?;
        let two = Apfloat::from_i64(2, INFINITE, radix)?;
        let y = self.exp()?;

        y.add(&one.div(&y)?)?.div(&two)
    }

    /// Hyperbolic sine, `(e^x - e^-x)/2`.
    ///
    /// ## Errors
    ///
    ///  - InfinitePrecision: the precision is infinite.
    ///  - Overflow: the result does not fit the representable exponent range.
    pub fn sinh(&self) -> Result<Self, Error> {
        let radix = self.radix();
        let one = Apfloat::one(radix)?;
        let two = Apfloat::from_i64(2, INFINITE, radix)?;
        let y = self.exp()?;

        y.sub(&one.div(&y)?)?.div(&two)
    }

    /// Hyperbolic tangent.
    ///
    /// ## Errors
    ///
    ///  - InfinitePrecision: the precision is infinite.
    pub fn tanh(&self) -> Result<Self, Error> {
        let radix = self.radix();
        let one = Apfloat::one(radix)?;
        let two = Apfloat::from_i64(2, INFINITE, radix)?;

        // (e^(2|x|) - 1) / (e^(2|x|) + 1), with the sign restored; the
        // magnitude keeps the exponent from overflowing for negative x
        let y = two.mul(&self.abs())?.exp()?;
        let y = y.sub(&one)?.div(&y.add(&one)?)?;

        Ok(if self.signum() < 0 { y.neg() } else { y })
    }

    /// Inverse hyperbolic sine, `log(x + sqrt(x^2 + 1))`.
    ///
    /// ## Errors
    ///
    ///  - InfinitePrecision: the precision is infinite.
    pub fn asinh(&self) -> Result<Self, Error> {
        let one = Apfloat::one(self.radix())?;
        let t = self.mul(self)?.add(&one)?.sqrt()?;

        // keep the argument of the logarithm at one or above
        if self.signum() >= 0 {
            t.add(self)?.ln()
        } else {
            Ok(t.sub(self)?.ln()?.neg())
        }
    }

    /// Inverse hyperbolic cosine, `log(x + sqrt(x^2 - 1))`.
    ///
    /// ## Errors
    ///
    ///  - Domain: the argument is below one.
    ///  - InfinitePrecision: the precision is infinite.
    pub fn acosh(&self) -> Result<Self, Error> {
        let one = Apfloat::one(self.radix())?;
        let t = self.mul(self)?.sub(&one)?.sqrt()?;

        if self.signum() >= 0 {
            self.add(&t)?.ln()
        } else {
            Ok(self.sub(&t)?.ln()?.neg())
        }
    }

    /// Inverse hyperbolic tangent, `log((1+x)/(1-x))/2`.
    ///
    /// ## Errors
    ///
    ///  - Domain: the magnitude of the argument is one or above.
    ///  - InfinitePrecision: the precision is infinite.
    pub fn atanh(&self) -> Result<Self, Error> {
        let radix = self.radix();
        let one = Apfloat::one(radix)?;
        let two = Apfloat::from_i64(2, INFINITE, radix)?;

        one.add(self)?.div(&one.sub(self)?)?.ln()?.div(&two)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_hyperbolics() {
        let p = 25;
        let one = Apfloat::from_i64(1, p, 10).unwrap();

        let r = one.cosh().unwrap();
        let refv = Apfloat::parse("1.543080634815243778477906", p, 10).unwrap();
        assert!(r.equal_digits(&refv) >= p - 3);

        let r = one.sinh().unwrap();
        let refv = Apfloat::parse("1.175201193643801456882382", p, 10).unwrap();
        assert!(r.equal_digits(&refv) >= p - 3);

        let r = one.tanh().unwrap();
        let refv = Apfloat::parse("0.761594155955764888119458", p, 10).unwrap();
        assert!(r.equal_digits(&refv) >= p - 3);

        // cosh^2 - sinh^2 == 1
        let c = one.cosh().unwrap();
        let s = one.sinh().unwrap();
        let t = c.mul(&c).unwrap().sub(&s.mul(&s).unwrap()).unwrap();
        assert!(t.equal_digits(&Apfloat::one(10).unwrap().with_precision(p)) >= p - 4);

        // odd and even symmetry
        let r = one.neg().sinh().unwrap();
        assert!(r.neg().equal_digits(&s) >= p - 3);
        let r = one.neg().cosh().unwrap();
        assert!(r.equal_digits(&c) >= p - 3);
        let r = one.neg().tanh().unwrap();
        assert_eq!(r.signum(), -1);
    }

    #[test]
    fn test_inverse_hyperbolics() {
        let p = 25;
        let one = Apfloat::from_i64(1, p, 10).unwrap();
        let two = Apfloat::from_i64(2, p, 10).unwrap();

        // asinh(1) = log(1 + sqrt(2))
        let r = one.asinh().unwrap();
        let refv = Apfloat::parse("0.881373587019543025232609", p, 10).unwrap();
        assert!(r.equal_digits(&refv) >= p - 3);

        // acosh(2) = log(2 + sqrt(3))
        let r = two.acosh().unwrap();
        let refv = Apfloat::parse("1.316957896924816708625046", p, 10).unwrap();
        assert!(r.equal_digits(&refv) >= p - 3);

        // atanh(0.5) = log(3)/2
        let half = Apfloat::parse("0.5", p, 10).unwrap();
        let r = half.atanh().unwrap();
        let refv = Apfloat::parse("0.549306144334054845697622", p, 10).unwrap();
        assert!(r.equal_digits(&refv) >= p - 3);

        // round trips
        let x = Apfloat::parse("1.75", p, 10).unwrap();
        let r = x.sinh().unwrap().asinh().unwrap();
        assert!(r.equal_digits(&x) >= p - 4);
        let r = x.cosh().unwrap().acosh().unwrap();
        assert!(r.equal_digits(&x) >= p - 4);
        let r = half.tanh().unwrap().atanh().unwrap();
        assert!(r.equal_digits(&half) >= p - 4);

        // negative arguments keep the log argument at one or above
        let r = x.neg().asinh().unwrap();
        assert!(r.neg().equal_digits(&x.sinh().unwrap().asinh().unwrap()) >= p - 4);

        // domain limits
        assert!(half.acosh().is_err());
        assert!(one.atanh().is_err());
        assert!(two.atanh().is_err());
    }
}
