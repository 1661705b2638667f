//! Complex values built from two [`Apfloat`] components, with the logarithm
//! and the exponent computed by the same AGM and Newton kernels as the real
//! ones. Only the surface the trigonometric functions need is provided.

use core::cmp::Ordering;

use crate::defs::double_precision;
use crate::defs::Error;
use crate::defs::Precision;
use crate::defs::EXTRA_PRECISION;
use crate::defs::INFINITE;
use crate::num::Apfloat;
use crate::ops::agm::agm;
use crate::ops::log::log_radix;
use crate::ops::other::multiply_add;
use crate::ops::other::multiply_subtract;
use crate::ops::other::scale;
use crate::ops::pi::pi_radix;
use crate::ops::util::extend_precision;
use crate::ops::util::extended;
use crate::ops::util::newton_plan;

// Agreement threshold, in digits, below which AGM convergence is still linear.
const CONVERGING: u64 = 1000;

// Extra digits of the raw AGM evaluation beyond the standard margin.
const RAW_LOG_EXTRA: Precision = 25;

/// A complex number; both components share one radix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apcomplex {
    re: Apfloat,
    im: Apfloat,
}

impl Apcomplex {
    /// Creates a complex value from its parts.
    pub fn new(re: Apfloat, im: Apfloat) -> Self {
        debug_assert_eq!(re.radix(), im.radix());
        Apcomplex { re, im }
    }

    /// Creates a complex value with a zero imaginary part.
    pub fn from_real(re: Apfloat) -> Result<Self, Error> {
        let im = Apfloat::zero(re.radix())?;
        Ok(Apcomplex { re, im })
    }

    fn one(radix: u32) -> Result<Self, Error> {
        Self::from_real(Apfloat::one(radix)?)
    }

    /// The real part.
    pub fn real(&self) -> &Apfloat {
        &self.re
    }

    /// The imaginary part.
    pub fn imag(&self) -> &Apfloat {
        &self.im
    }

    /// The radix of the components.
    pub fn radix(&self) -> u32 {
        self.re.radix()
    }

    /// The worse of the component precisions.
    pub fn precision(&self) -> Precision {
        self.re.precision().min(self.im.precision())
    }

    /// The scale of the dominant component.
    pub fn scale(&self) -> i64 {
        if self.re.is_zero() {
            self.im.scale()
        } else if self.im.is_zero() {
            self.re.scale()
        } else {
            self.re.scale().max(self.im.scale())
        }
    }

    /// True when both components are zero.
    pub fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }

    fn is_one(&self) -> bool {
        self.re.is_one() && self.im.is_zero()
    }

    /// Both components viewed at precision `p`.
    pub fn with_precision(&self, p: Precision) -> Self {
        Apcomplex {
            re: self.re.with_precision(p),
            im: self.im.with_precision(p),
        }
    }

    fn neg(&self) -> Self {
        Apcomplex {
            re: self.re.neg(),
            im: self.im.neg(),
        }
    }

    fn add(&self, other: &Self) -> Result<Self, Error> {
        Ok(Apcomplex {
            re: self.re.add(&other.re)?,
            im: self.im.add(&other.im)?,
        })
    }

    fn sub(&self, other: &Self) -> Result<Self, Error> {
        Ok(Apcomplex {
            re: self.re.sub(&other.re)?,
            im: self.im.sub(&other.im)?,
        })
    }

    fn mul(&self, other: &Self) -> Result<Self, Error> {
        Ok(Apcomplex {
            re: multiply_subtract(&self.re, &other.re, &self.im, &other.im)?,
            im: multiply_add(&self.re, &other.im, &self.im, &other.re)?,
        })
    }

    fn mul_real(&self, x: &Apfloat) -> Result<Self, Error> {
        Ok(Apcomplex {
            re: self.re.mul(x)?,
            im: self.im.mul(x)?,
        })
    }

    pub(crate) fn div(&self, other: &Self) -> Result<Self, Error> {
        if other.is_zero() {
            return Err(Error::DivisionByZero);
        }

        // w/z = w * conj(z) / |z|^2
        let norm = multiply_add(&other.re, &other.re, &other.im, &other.im)?;
        let num = self.mul(&other.neg_imag())?;

        num.div_real(&norm)
    }

    fn div_real(&self, x: &Apfloat) -> Result<Self, Error> {
        Ok(Apcomplex {
            re: self.re.div(x)?,
            im: self.im.div(x)?,
        })
    }

    fn neg_imag(&self) -> Self {
        Apcomplex {
            re: self.re.clone(),
            im: self.im.neg(),
        }
    }

    fn scaled(&self, k: i64) -> Result<Self, Error> {
        Ok(Apcomplex {
            re: scale(&self.re, k)?,
            im: scale(&self.im, k)?,
        })
    }

    // Leading digits the two values agree on, measured on the dominant components.
    fn equal_digits(&self, other: &Self) -> Precision {
        let cap = self.precision().min(other.precision());

        match self.sub(other) {
            Ok(d) if d.is_zero() => cap,
            Ok(d) => {
                let ed = self.scale() as i128 - d.scale() as i128;
                if ed <= 0 {
                    0
                } else {
                    (ed as u64).min(cap)
                }
            }
            Err(_) => 0,
        }
    }

    fn powi(&self, n: u64) -> Result<Self, Error> {
        debug_assert!(n > 0);

        let mut x = self.clone();
        let mut n = n;

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

    // The same Newton iteration as the real engine, over complex arithmetic,
    // seeded from the polar form of the f64 view of the scale-reduced value.
    fn inverse_root(&self, n: i64, target_precision: Precision) -> Result<Self, Error> {
        debug_assert!(n > 0);

        if self.is_zero() {
            return Err(Error::Domain("inverse root of zero"));
        }
        if target_precision == 0 {
            return Err(Error::InvalidPrecision(target_precision));
        }
        if target_precision == INFINITE {
            return Err(Error::InfinitePrecision("inverse root"));
        }
        if self.is_one() {
            return Ok(self.with_precision(target_precision));
        }
        if self.im.is_zero() && (self.re.signum() > 0 || n & 1 == 1) {
            return Self::from_real(self.re.inverse_root_prec(n, target_precision)?);
        }

        let radix = self.radix();
        let double_prec = double_precision(radix);
        let one = Self::one(radix)?;
        let divisor = Apfloat::from_i64(n, INFINITE, radix)?;

        let scale_quot = self.scale() / n;
        let scale_rem = self.scale() - scale_quot * n;

        let t = self.with_precision(double_prec).scaled(scale_rem - self.scale())?;
        let (tr, ti) = (t.re.to_f64(), t.im.to_f64());

        let mag = tr.hypot(ti).powf(-1.0 / n as f64);
        let ang = -ti.atan2(tr) / n as f64;

        let seed = Apcomplex {
            re: Apfloat::from_f64(mag * ang.cos(), double_prec, radix)?,
            im: Apfloat::from_f64(mag * ang.sin(), double_prec, radix)?,
        };

        let mut result = seed.scaled(-scale_quot)?;
        let mut precision = double_prec;

        let plan = newton_plan(precision, target_precision);
        let mut iterations = plan.iterations;
        let precising = plan.precising;

        while iterations > 0 {
            iterations -= 1;

            precision = precision.saturating_mul(2);
            result = result.with_precision(precision.min(target_precision));

            let mut t = one.sub(&self.mul(&result.powi(n as u64)?)?)?;
            if iterations < precising {
                t = t.with_precision((precision / 2).max(1));
            }

            result = result.add(&result.mul(&t)?.div_real(&divisor)?)?;

            if iterations == precising {
                let t = one.sub(&self.mul(&result.powi(n as u64)?)?)?;
                result = result.add(&result.mul(&t)?.div_real(&divisor)?)?;
            }
        }

        Ok(result.with_precision(target_precision))
    }

    // Principal square root.
    fn sqrt(&self) -> Result<Self, Error> {
        if self.is_zero() {
            return Self::from_real(Apfloat::zero(self.radix())?);
        }

        if self.im.is_zero() {
            if self.re.signum() > 0 {
                return Self::from_real(self.re.sqrt()?);
            }

            // sqrt(-a) = i*sqrt(a)
            let r = self.re.neg().sqrt()?;
            return Ok(Apcomplex {
                re: Apfloat::zero(self.radix())?,
                im: r,
            });
        }

        self.mul(&self.inverse_root(2, self.precision())?)
    }

    /// Principal-branch natural logarithm; the imaginary part lies in (-π, π].
    ///
    /// ## Errors
    ///
    ///  - Domain: the value is zero.
    ///  - InfinitePrecision: the precision is infinite.
    pub fn log(&self) -> Result<Self, Error> {
        if self.is_zero() {
            return Err(Error::Domain("logarithm of zero"));
        }
        if self.is_one() {
            return Self::from_real(Apfloat::zero(self.radix())?);
        }

        let target = self.precision();
        if target == INFINITE {
            return Err(Error::InfinitePrecision("logarithm"));
        }

        let radix = self.radix();

        // a value close to one loses significance, as in the real case
        let one = Self::one(radix)?;
        let final_precision = target.saturating_sub(one.equal_digits(self)).max(1);

        let s = self.scale();
        let z = self.scaled(-s)?;

        let raw = Self::raw_log(&z)?;

        let result = if s == 0 {
            raw
        } else {
            let log_r = extended(&log_radix(target, radix)?);
            let power = Apfloat::from_i64(s, INFINITE, radix)?.mul(&log_r)?;
            raw.add(&Self::from_real(power)?)?
        };

        Ok(result.with_precision(final_precision))
    }

    // The real raw-log AGM formula with the second mean taken over complex values.
    fn raw_log(z: &Self) -> Result<Self, Error> {
        let target = z.precision();
        let radix = z.radix();
        let working = extend_precision(target);
        let n = (target / 2 + RAW_LOG_EXTRA) as i64;

        let one = Apfloat::one(radix)?;
        let one_c = Self::one(radix)?;

        let e = scale(&one.with_precision(working), -n)?;
        let z = extended_by_complex(z, RAW_LOG_EXTRA).scaled(-n)?;

        let agme = extended(&agm(&one, &e)?);
        let agmez = extended_complex(&Self::agm(&one_c, &z)?);

        let pi = extended(&pi_radix(target, radix)?);
        let two = Apfloat::from_i64(2, INFINITE, radix)?;

        let num = agmez.sub(&Self::from_real(agme.clone())?)?.mul_real(&pi)?;
        let den = agmez.mul_real(&two.mul(&agme)?)?;

        Ok(num.div(&den)?.with_precision(target))
    }

    // Complex arithmetic-geometric mean with the principal square root branch.
    fn agm(a: &Self, b: &Self) -> Result<Self, Error> {
        if a.is_zero() || b.is_zero() {
            return Self::from_real(Apfloat::zero(a.radix())?);
        }

        let working = a.precision().min(b.precision());
        if working == INFINITE {
            return Err(Error::InfinitePrecision("agm"));
        }

        let target = a.precision().max(b.precision());
        let working = extend_precision(working);
        let mut a = ensure_precision_complex(a, working);
        let mut b = ensure_precision_complex(b, working);

        let half_working = (working + 1) / 2;
        let two = Apfloat::from_i64(2, INFINITE, a.radix())?;
        let mut precision = 0u64;

        while precision < CONVERGING && precision < half_working {
            let t = a.add(&b)?.div_real(&two)?;
            b = a.mul(&b)?.sqrt()?;
            a = t;

            a = ensure_precision_complex(&a, working);
            b = ensure_precision_complex(&b, working);

            precision = a.equal_digits(&b);
        }

        while precision <= half_working {
            let t = a.add(&b)?.div_real(&two)?;
            b = a.mul(&b)?.sqrt()?;
            a = t;

            a = ensure_precision_complex(&a, working);
            b = ensure_precision_complex(&b, working);

            precision = precision.saturating_mul(2).max(1);
        }

        Ok(a.add(&b)?.div_real(&two)?.with_precision(target))
    }

    /// Exponent function. The imaginary part is reduced modulo 2π first, so
    /// the iteration agrees with the principal branch of the logarithm.
    ///
    /// ## Errors
    ///
    ///  - InfinitePrecision: the precision is infinite.
    ///  - Overflow: the real part pushes the result out of the exponent range.
    pub fn exp(&self) -> Result<Self, Error> {
        let radix = self.radix();

        if self.is_zero() {
            return Self::one(radix);
        }

        let double_prec = double_precision(radix);

        let boost = 1i64.saturating_sub(self.scale()).max(0) as u64;
        let target = match self.precision() {
            INFINITE => return Err(Error::InfinitePrecision("exponent")),
            p => p.saturating_add(boost).min(INFINITE - 1),
        };

        if !self.re.is_zero() {
            let limit =
                Apfloat::from_f64(i64::MAX as f64 * (radix as f64).ln(), double_prec, radix)?;
            if self.re.cmp_to(&limit) != Ordering::Less {
                return Err(Error::Overflow);
            }
        }

        if self.scale() <= i64::MIN / 2 + EXTRA_PRECISION as i64 {
            // Taylor series: exp(z) = 1 + z + z^2/2 + ...
            return Self::one(radix)?.add(self);
        }

        let im = self.reduced_imag(target)?;
        let (mut result, mut precision);

        if self.scale() < -(double_prec as i64) / 2 {
            // Taylor series: exp(z) = 1 + z + z^2/2 + ...
            precision = (-2 * self.scale()) as u64;
            result = Self::from_real(Apfloat::from_i64(1, precision, radix)?)?.add(self)?;
        } else {
            // modulus seed from the real part, as in the real exponent
            let v = self.re.to_f64() / (radix as f64).ln();
            let ip = v.floor();
            let fp = v - ip;

            let modulus = Apfloat::from_f64((radix as f64).powf(fp), double_prec, radix)?;
            let modulus = scale(&modulus, ip as i64)?;

            let ang = im.to_f64();
            result = Apcomplex {
                re: modulus.mul(&Apfloat::from_f64(ang.cos(), double_prec, radix)?)?,
                im: modulus.mul(&Apfloat::from_f64(ang.sin(), double_prec, radix)?)?,
            };

            let ip_digits = if ip > 0.0 {
                ((ip + 0.5).ln() / (radix as f64).ln()).floor() as u64
            } else {
                0
            };
            precision = double_prec.saturating_sub(ip_digits).max(1);
        }

        newton_exp(&Apcomplex::new(self.re.clone(), im), target, &mut result, &mut precision)?;

        Ok(result.with_precision(target))
    }

    // Imaginary part folded into (-π, π] using the cached π.
    fn reduced_imag(&self, target: Precision) -> Result<Apfloat, Error> {
        let im = &self.im;
        if im.is_zero() || im.scale() <= 0 {
            return Ok(im.clone());
        }

        let radix = self.radix();
        let p = target
            .saturating_add(im.scale().max(0) as u64)
            .saturating_add(EXTRA_PRECISION);
        let pi = pi_radix(p, radix)?;
        let two = Apfloat::from_i64(2, INFINITE, radix)?;
        let two_pi = pi.mul(&two)?;

        let mut r = im.with_precision(p).fmod(&two_pi)?;

        if r.cmp_to(&pi) == Ordering::Greater {
            r = r.sub(&two_pi)?;
        } else if r.cmp_to(&pi.neg()) != Ordering::Greater {
            r = r.add(&two_pi)?;
        }

        Ok(r)
    }
}

// y <- y + y*(z - log(y)), with the precising round as in the real engine.
fn newton_exp(
    z: &Apcomplex,
    target: Precision,
    result: &mut Apcomplex,
    precision: &mut Precision,
) -> Result<(), Error> {
    log_radix(target, z.radix())?;

    let z = z.with_precision(extend_precision(z.precision()));

    let plan = newton_plan(*precision, target);
    let mut iterations = plan.iterations;
    let precising = plan.precising;

    while iterations > 0 {
        iterations -= 1;

        *precision = precision.saturating_mul(2);
        *result = result.with_precision((*precision).min(target));

        let mut t = z.sub(&result.log()?)?;
        if iterations < precising {
            t = t.with_precision((*precision / 2).max(1));
        }

        *result = result.add(&result.mul(&t)?)?;

        if iterations == precising {
            let t = z.sub(&result.log()?)?;
            *result = result.add(&result.mul(&t)?)?;
        }
    }

    Ok(())
}

fn ensure_precision_complex(x: &Apcomplex, p: Precision) -> Apcomplex {
    if x.precision() < p {
        x.with_precision(p)
    } else {
        x.clone()
    }
}

fn extended_complex(x: &Apcomplex) -> Apcomplex {
    x.with_precision(extend_precision(x.precision()))
}

fn extended_by_complex(x: &Apcomplex, extra: Precision) -> Apcomplex {
    x.with_precision(x.precision().saturating_add(extra))
}
