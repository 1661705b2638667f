//! Roots and the inverse root iteration.

use crate::defs::double_precision;
use crate::defs::Error;
use crate::defs::Precision;
use crate::defs::INFINITE;
use crate::num::Apfloat;
use crate::ops::other::scale;
use crate::ops::util::newton_plan;

impl Apfloat {
    /// Square root.
    ///
    /// ## Errors
    ///
    ///  - Domain: the argument is negative.
    ///  - InfinitePrecision: the precision is infinite.
    pub fn sqrt(&self) -> Result<Self, Error> {
        self.root(2)
    }

    /// Cube root.
    ///
    /// ## Errors
    ///
    ///  - InfinitePrecision: the precision is infinite.
    pub fn cbrt(&self) -> Result<Self, Error> {
        self.root(3)
    }

    /// Integer root, `self^(1/n)`.
    ///
    /// ## Errors
    ///
    ///  - Domain: `n` and the argument are both zero, or the argument is
    ///    negative and `n` is even.
    ///  - InfinitePrecision: the precision is infinite and the root is not trivial.
    pub fn root(&self, n: i64) -> Result<Self, Error> {
        if n == 0 {
            if self.is_zero() {
                return Err(Error::Domain("zeroth root of zero"));
            }

            Apfloat::one(self.radix())
        } else if self.is_zero() {
            Apfloat::zero(self.radix()) // avoid division by zero
        } else if n == 1 {
            Ok(self.clone())
        } else if n == i64::MIN {
            // -n overflows, take the root in two steps
            self.root(n / -2)?.sqrt()
        } else if n < 0 {
            self.inverse_root(-n)
        } else if n == 2 {
            self.mul(&self.inverse_root(2)?)
        } else if n == 3 {
            self.mul(&self.mul(self)?.inverse_root(3)?)
        } else {
            self.inverse_root(n)?.inverse_root(1)
        }
    }

    /// Inverse integer root, `self^(-1/n)`, at the argument's precision.
    ///
    /// This iteration is the basis of the non-elementary operations: division
    /// refinement, [`sqrt`](Self::sqrt), [`root`](Self::root), and the π
    /// assembly all build on it.
    ///
    /// ## Errors
    ///
    ///  - Domain: the argument is zero, or negative with even `n`.
    ///  - InfinitePrecision: the precision is infinite.
    pub fn inverse_root(&self, n: i64) -> Result<Self, Error> {
        self.inverse_root_prec(n, self.precision())
    }

    /// Inverse integer root at the given target precision.
    ///
    /// ## Errors
    ///
    ///  - Domain: the argument is zero, or negative with even `n`.
    ///  - InvalidPrecision: the target precision is zero.
    ///  - InfinitePrecision: the target precision is infinite.
    pub fn inverse_root_prec(&self, n: i64, target_precision: Precision) -> Result<Self, Error> {
        self.inverse_root_seeded(n, target_precision, None)
    }

    /// Inverse integer root with an initial guess carried over from an earlier
    /// computation. The guess's own precision decides how many iterations are
    /// skipped; guesses below the native `f64` precision are ignored.
    ///
    /// ## Errors
    ///
    ///  - Domain: the argument is zero, or negative with even `n`.
    ///  - InvalidPrecision: the target precision is zero.
    ///  - InfinitePrecision: the target precision is infinite.
    pub fn inverse_root_seeded(
        &self,
        n: i64,
        target_precision: Precision,
        initial_guess: Option<&Self>,
    ) -> Result<Self, Error> {
        if self.is_zero() {
            return Err(Error::Domain("inverse root of zero"));
        } else if n == 0 {
            return Apfloat::one(self.radix());
        } else if n & 1 == 0 && self.signum() < 0 {
            return Err(Error::Domain("even root of negative number; result would be complex"));
        } else if target_precision == 0 {
            return Err(Error::InvalidPrecision(target_precision));
        } else if self.is_one() {
            return Ok(self.with_precision(target_precision));
        } else if target_precision == INFINITE {
            return Err(Error::InfinitePrecision("inverse root"));
        } else if n == i64::MIN {
            // -n overflows, take the root in two steps
            return self
                .inverse_root_prec(n / -2, target_precision)?
                .inverse_root_prec(2, target_precision);
        } else if n < 0 {
            return self
                .inverse_root_prec(-n, target_precision)?
                .inverse_root_prec(1, target_precision);
        }

        let radix = self.radix();
        let double_prec = double_precision(radix);
        let one = Apfloat::one(radix)?;
        let divisor = Apfloat::from_i64(n, INFINITE, radix)?;

        let (mut result, mut precision) = match initial_guess {
            Some(guess) if guess.precision() >= double_prec => (guess.clone(), guess.precision()),
            _ => {
                // Factor out the scale so that the f64 view of the value stays
                // representable regardless of the argument's magnitude.
                let scale_quot = self.scale() / n;
                let scale_rem = self.scale() - scale_quot * n;

                let t = self.with_precision(double_prec);
                let t = scale(&t, scale_rem - t.scale())?;

                let v = t.signum() as f64 * t.to_f64().abs().powf(-1.0 / n as f64);
                let seed = Apfloat::from_f64(v, double_prec, radix)?;

                (scale(&seed, -scale_quot)?, double_prec)
            }
        };

        let plan = newton_plan(precision, target_precision);
        let mut iterations = plan.iterations;
        let precising = plan.precising;

        // y <- y + y*(1 - x*y^n)/n doubles the known digits of y each step
        while iterations > 0 {
            iterations -= 1;

            precision = precision.saturating_mul(2);
            result = result.with_precision(precision.min(target_precision));

            let mut t = one.sub(&self.mul(&result.powi(n)?)?)?;
            if iterations < precising {
                // the correction is small; full precision would be wasted
                t = t.with_precision((precision / 2).max(1));
            }

            result = result.add(&result.mul(&t)?.div(&divisor)?)?;

            if iterations == precising {
                let t = one.sub(&self.mul(&result.powi(n)?)?)?;
                result = result.add(&result.mul(&t)?.div(&divisor)?)?;
            }
        }

        Ok(result.with_precision(target_precision))
    }
}
