//! Apfloat definition and basic arithmetic, comparison, and number manipulation operations.

use core::cmp::Ordering;
use core::fmt;

use num_bigint::BigInt;
use num_bigint::BigUint;
use num_bigint::Sign as MantissaSign;
use num_integer::Integer;
use num_traits::One;
use num_traits::Pow;
use num_traits::ToPrimitive;
use num_traits::Zero;

use crate::defs::double_precision;
use crate::defs::Error;
use crate::defs::Precision;
use crate::defs::INFINITE;
use crate::defs::MAX_RADIX;
use crate::defs::MIN_RADIX;

// Largest digit distance two operands may span before the smaller one stops
// contributing to a sum. Keeps eagerly materialized mantissas bounded.
const ALIGN_CAP: i128 = 1 << 26;

/// An arbitrary-precision floating point number in a radix between 2 and 36.
///
/// The value is `mantissa * radix^exp`. The mantissa carries the sign and never
/// ends in a zero digit of the radix. Precision is counted in radix digits and
/// is a property of the value, not of the type; [`INFINITE`] marks exact values.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Apfloat {
    m: BigInt,
    exp: i64,
    digits: u64,
    precision: Precision,
    radix: u32,
}

impl Apfloat {
    fn check(precision: Precision, radix: u32) -> Result<(), Error> {
        if !(MIN_RADIX..=MAX_RADIX).contains(&radix) {
            return Err(Error::InvalidRadix(radix));
        }
        if precision == 0 {
            return Err(Error::InvalidPrecision(precision));
        }
        Ok(())
    }

    fn zero_raw(radix: u32) -> Self {
        Apfloat {
            m: BigInt::zero(),
            exp: 0,
            digits: 0,
            precision: INFINITE,
            radix,
        }
    }

    // Normalizes the mantissa and truncates it to the precision.
    fn make(m: BigInt, exp: i64, precision: Precision, radix: u32) -> Self {
        debug_assert!((MIN_RADIX..=MAX_RADIX).contains(&radix));
        debug_assert!(precision >= 1);

        if m.is_zero() {
            return Self::zero_raw(radix);
        }

        let (mut m, mut exp) = trim_zeros(m, exp, radix);
        let mut digits = digit_count(m.magnitude(), radix);

        if precision != INFINITE && digits > precision {
            let drop = digits - precision;
            m = &m / radix_pow(radix, drop);
            exp = exp.saturating_add(drop as i64);

            (m, exp) = trim_zeros(m, exp, radix);
            digits = digit_count(m.magnitude(), radix);
        }

        Apfloat {
            m,
            exp,
            digits,
            precision,
            radix,
        }
    }

    /// Returns zero in the given radix. Zero is always exact.
    ///
    /// ## Errors
    ///
    ///  - InvalidRadix: the radix is outside 2..=36.
    pub fn zero(radix: u32) -> Result<Self, Error> {
        Self::check(INFINITE, radix)?;
        Ok(Self::zero_raw(radix))
    }

    /// Returns one in the given radix at infinite precision.
    ///
    /// ## Errors
    ///
    ///  - InvalidRadix: the radix is outside 2..=36.
    pub fn one(radix: u32) -> Result<Self, Error> {
        Self::from_i64(1, INFINITE, radix)
    }

    /// Returns a new number with value `v` and the given precision.
    ///
    /// ## Errors
    ///
    ///  - InvalidRadix: the radix is outside 2..=36.
    ///  - InvalidPrecision: the precision is zero.
    pub fn from_i64(v: i64, precision: Precision, radix: u32) -> Result<Self, Error> {
        Self::check(precision, radix)?;
        Ok(Self::make(BigInt::from(v), 0, precision, radix))
    }

    /// Returns a new number closest to `v` representable with the given precision.
    /// At most the digits representable by an `f64` are derived from `v`.
    ///
    /// ## Errors
    ///
    ///  - InvalidRadix: the radix is outside 2..=36.
    ///  - InvalidPrecision: the precision is zero.
    ///  - InfinitePrecision: the precision is infinite.
    ///  - Overflow: `v` is not finite.
    pub fn from_f64(v: f64, precision: Precision, radix: u32) -> Result<Self, Error> {
        Self::check(precision, radix)?;
        if precision == INFINITE {
            return Err(Error::InfinitePrecision("conversion from f64"));
        }
        if !v.is_finite() {
            return Err(Error::Overflow);
        }
        if v == 0.0 {
            return Ok(Self::zero_raw(radix));
        }

        let r = radix as f64;
        let a = v.abs();
        let mut e = a.log(r).floor() as i64;

        // two-step scaling; r^e alone can overflow to infinity
        let h = e / 2;
        let mut frac = a / r.powi(h as i32) / r.powi((e - h) as i32);

        while frac >= r {
            frac /= r;
            e += 1;
        }
        while frac < 1.0 {
            frac *= r;
            e -= 1;
        }

        let nd = precision.min(double_precision(radix) + 2);
        let rad_big = BigInt::from(radix);
        let mut m = BigInt::zero();

        for _ in 0..nd {
            let d = (frac as u32).min(radix - 1);
            m = m * &rad_big + d;
            frac = (frac - d as f64) * r;
        }

        if v < 0.0 {
            m = -m;
        }

        Ok(Self::make(m, e - (nd as i64 - 1), precision, radix))
    }

    /// Parses a number from its digit representation in the given radix.
    ///
    /// The accepted form is an optional sign, digits with at most one point,
    /// and, when the radix is at most 14, an optional exponent written as
    /// `e<k>`. For larger radixes `e` is a digit and no exponent is accepted.
    ///
    /// ## Errors
    ///
    ///  - InvalidRadix: the radix is outside 2..=36.
    ///  - InvalidPrecision: the precision is zero.
    ///  - Parse: the string is not a number in the radix.
    pub fn parse(s: &str, precision: Precision, radix: u32) -> Result<Self, Error> {
        Self::check(precision, radix)?;

        let err = || Error::Parse(s.into(), radix);
        let t = s.trim();
        let (neg, t) = match t.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, t.strip_prefix('+').unwrap_or(t)),
        };

        let (mant, e) = if radix <= 14 {
            match t.find(['e', 'E']) {
                Some(pos) => {
                    let (a, b) = t.split_at(pos);
                    let e: i64 = b[1..].parse().map_err(|_| err())?;
                    (a, e)
                }
                None => (t, 0),
            }
        } else {
            (t, 0)
        };

        let rad_big = BigInt::from(radix);
        let mut m = BigInt::zero();
        let mut frac: i64 = 0;
        let mut seen_point = false;
        let mut seen_digit = false;

        for c in mant.chars() {
            if c == '.' {
                if seen_point {
                    return Err(err());
                }
                seen_point = true;
            } else {
                let d = c.to_digit(radix).ok_or_else(err)?;
                m = m * &rad_big + d;
                if seen_point {
                    frac += 1;
                }
                seen_digit = true;
            }
        }

        if !seen_digit {
            return Err(err());
        }
        if neg {
            m = -m;
        }

        let exp = e.checked_sub(frac).ok_or(Error::Overflow)?;

        Ok(Self::make(m, exp, precision, radix))
    }

    /// Returns the radix of the number.
    #[inline]
    pub fn radix(&self) -> u32 {
        self.radix
    }

    /// Returns the precision of the number in radix digits.
    #[inline]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Returns the position of the most significant digit relative to the radix
    /// point: the value lies in `[radix^(scale-1), radix^scale)`. Zero has scale 0.
    #[inline]
    pub fn scale(&self) -> i64 {
        self.exp.saturating_add(self.digits as i64)
    }

    /// Returns -1, 0, or 1 for negative, zero, and positive values.
    #[inline]
    pub fn signum(&self) -> i32 {
        match self.m.sign() {
            MantissaSign::Minus => -1,
            MantissaSign::NoSign => 0,
            MantissaSign::Plus => 1,
        }
    }

    /// Returns true if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.m.is_zero()
    }

    /// Returns true if the value is one.
    #[inline]
    pub fn is_one(&self) -> bool {
        self.exp == 0 && self.m.is_one()
    }

    pub(crate) fn digit_len(&self) -> u64 {
        self.digits
    }

    /// Returns the same value viewed at precision `p`, at least one digit.
    /// Digits beyond the known content are not derived; widening the precision
    /// past them is the caller's responsibility.
    pub fn with_precision(&self, p: Precision) -> Self {
        let p = p.max(1);

        if self.is_zero() || p == self.precision {
            return self.clone();
        }

        if p >= self.digits {
            let mut r = self.clone();
            r.precision = p;
            r
        } else {
            Self::make(self.m.clone(), self.exp, p, self.radix)
        }
    }

    // Position right below the last significant digit; i128::MIN when exact.
    pub(crate) fn lsd(&self) -> i128 {
        if self.precision == INFINITE {
            i128::MIN
        } else {
            self.scale() as i128 - self.precision as i128
        }
    }

    /// Returns the negated value.
    pub fn neg(&self) -> Self {
        let mut r = self.clone();
        r.m = -r.m;
        r
    }

    /// Returns the absolute value.
    pub fn abs(&self) -> Self {
        if self.signum() >= 0 {
            self.clone()
        } else {
            self.neg()
        }
    }

    /// Addition.
    ///
    /// ## Errors
    ///
    ///  - Overflow: the result exponent is outside the representable range.
    pub fn add(&self, other: &Self) -> Result<Self, Error> {
        self.add_impl(other, false)
    }

    /// Subtraction.
    ///
    /// ## Errors
    ///
    ///  - Overflow: the result exponent is outside the representable range.
    pub fn sub(&self, other: &Self) -> Result<Self, Error> {
        self.add_impl(other, true)
    }

    fn add_impl(&self, other: &Self, negate_other: bool) -> Result<Self, Error> {
        debug_assert_eq!(self.radix, other.radix);

        if other.is_zero() {
            return Ok(self.clone());
        }
        if self.is_zero() {
            return Ok(if negate_other { other.neg() } else { other.clone() });
        }

        // digits below the worse of the two last-significant-digit positions
        // are not known in the result
        let lsd = self.lsd().max(other.lsd());

        if (other.scale() as i128) < lsd {
            return Ok(self.clone());
        }
        if (self.scale() as i128) < lsd {
            return Ok(if negate_other { other.neg() } else { other.clone() });
        }

        let e = self.exp.min(other.exp);
        let sa = self.exp as i128 - e as i128;
        let sb = other.exp as i128 - e as i128;

        if sa.max(sb) > ALIGN_CAP {
            // the gap is all zero digits; the smaller value cannot be observed
            return if self.scale() >= other.scale() {
                Ok(self.clone())
            } else {
                Ok(if negate_other { other.neg() } else { other.clone() })
            };
        }

        let ma = &self.m * radix_pow(self.radix, sa as u64);
        let mut mb = &other.m * radix_pow(self.radix, sb as u64);
        if negate_other {
            mb = -mb;
        }

        let m = ma + mb;
        if m.is_zero() {
            return Ok(Self::zero_raw(self.radix));
        }

        let r = Self::make(m, e, INFINITE, self.radix);
        let p = if lsd == i128::MIN {
            INFINITE
        } else {
            (r.scale() as i128 - lsd).clamp(1, (INFINITE - 1) as i128) as Precision
        };

        Ok(r.with_precision(p))
    }

    /// Multiplication. The result precision is the worse of the two operands.
    ///
    /// ## Errors
    ///
    ///  - Overflow: the result exponent is outside the representable range.
    pub fn mul(&self, other: &Self) -> Result<Self, Error> {
        debug_assert_eq!(self.radix, other.radix);

        if self.is_zero() || other.is_zero() {
            return Ok(Self::zero_raw(self.radix));
        }

        let p = self.precision.min(other.precision);
        let exp = exp_from(self.exp as i128 + other.exp as i128)?;

        Ok(Self::make(&self.m * &other.m, exp, p, self.radix))
    }

    /// Division. The result precision is the worse of the two operands; when
    /// both are exact the quotient must terminate in the radix.
    ///
    /// ## Errors
    ///
    ///  - DivisionByZero: `other` is zero.
    ///  - InfiniteExpansion: both operands are exact and the quotient is not.
    ///  - Overflow: the result exponent is outside the representable range.
    pub fn div(&self, other: &Self) -> Result<Self, Error> {
        debug_assert_eq!(self.radix, other.radix);

        if other.is_zero() {
            return Err(Error::DivisionByZero);
        }
        if self.is_zero() {
            return Ok(Self::zero_raw(self.radix));
        }

        let p = self.precision.min(other.precision);

        if p == INFINITE {
            return self.div_exact(other);
        }

        let shift = p
            .saturating_add(2)
            .saturating_add(other.digits)
            .saturating_sub(self.digits);
        let q = (&self.m * radix_pow(self.radix, shift)) / &other.m;
        let exp = exp_from(self.exp as i128 - other.exp as i128 - shift as i128)?;

        Ok(Self::make(q, exp, p, self.radix))
    }

    // Division of two exact values; fails unless the expansion terminates.
    fn div_exact(&self, other: &Self) -> Result<Self, Error> {
        let g = self.m.gcd(&other.m);
        let mut d = (&other.m / &g).magnitude().clone();
        let rad = BigUint::from(self.radix);

        // strip every prime factor the denominator shares with the radix
        loop {
            let e = d.gcd(&rad);
            if e.is_one() {
                break;
            }
            d /= e;
        }

        if !d.is_one() {
            return Err(Error::InfiniteExpansion("division"));
        }

        let mut num = self.m.clone();
        let mut j: i128 = 0;
        let rad = BigInt::from(self.radix);
        while !(&num % &other.m).is_zero() {
            num *= &rad;
            j += 1;
        }

        let q = num / &other.m;
        let exp = exp_from(self.exp as i128 - other.exp as i128 - j)?;

        Ok(Self::make(q, exp, INFINITE, self.radix))
    }

    /// Compares the values, ignoring precision.
    pub fn cmp_to(&self, other: &Self) -> Ordering {
        debug_assert_eq!(self.radix, other.radix);

        let (sa, sb) = (self.signum(), other.signum());
        if sa != sb {
            return sa.cmp(&sb);
        }
        if sa == 0 {
            return Ordering::Equal;
        }

        // normalized mantissas make the scale the magnitude order
        let mag = if self.scale() != other.scale() {
            self.scale().cmp(&other.scale())
        } else {
            let e = self.exp.min(other.exp);
            let ma = self.m.magnitude() * radix_pow_mag(self.radix, (self.exp - e) as u64);
            let mb = other.m.magnitude() * radix_pow_mag(self.radix, (other.exp - e) as u64);
            ma.cmp(&mb)
        };

        if sa > 0 {
            mag
        } else {
            mag.reverse()
        }
    }

    /// Returns the number of leading radix digits the two values agree on,
    /// capped by the worse of the two precisions. Values of different sign or
    /// different scale, and zeroes, share no digits.
    pub fn equal_digits(&self, other: &Self) -> Precision {
        if self.is_zero() || other.is_zero() || self.signum() != other.signum() {
            return 0;
        }

        if self.cmp_to(other) == Ordering::Equal {
            return self.precision.min(other.precision);
        }

        if self.scale() != other.scale() {
            return 0;
        }

        match self.sub(other) {
            Ok(d) if !d.is_zero() => {
                let ed = self.scale() as i128 - d.scale() as i128;
                let cap = self.precision.min(other.precision);
                if ed <= 0 {
                    0
                } else {
                    (ed as u64).min(cap)
                }
            }
            _ => 0,
        }
    }

    /// Rounds towards zero. The result is an integer at infinite precision.
    pub fn truncate(&self) -> Self {
        self.to_integer(|_, _| 0)
    }

    /// Rounds towards negative infinity. The result is an integer at infinite precision.
    pub fn floor(&self) -> Self {
        self.to_integer(|sign, rem| if sign < 0 && rem { -1 } else { 0 })
    }

    /// Rounds towards positive infinity. The result is an integer at infinite precision.
    pub fn ceil(&self) -> Self {
        self.to_integer(|sign, rem| if sign > 0 && rem { 1 } else { 0 })
    }

    fn to_integer(&self, adjust: impl Fn(i32, bool) -> i64) -> Self {
        if self.is_zero() {
            return Self::zero_raw(self.radix);
        }

        if self.exp >= 0 {
            return Self::make(self.m.clone(), self.exp, INFINITE, self.radix);
        }

        let (q, rem) = if self.scale() <= 0 {
            (BigInt::zero(), true)
        } else {
            let (q, r) = self.m.div_rem(&radix_pow(self.radix, self.exp.unsigned_abs()));
            (q, !r.is_zero())
        };

        let q = q + adjust(self.signum(), rem);

        Self::make(q, 0, INFINITE, self.radix)
    }

    /// Lossy conversion to `f64`. Values outside the `f64` range become
    /// infinities or zero.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }

        let keep = self.digits.min(double_precision(self.radix) + 3);
        let drop = self.digits - keep;
        let top = &self.m / radix_pow(self.radix, drop);
        let v = top.to_f64().unwrap_or(f64::NAN);

        v * (self.radix as f64).powf(self.exp as f64 + drop as f64)
    }
}

impl PartialEq for Apfloat {
    fn eq(&self, other: &Self) -> bool {
        self.radix == other.radix && self.cmp_to(other) == Ordering::Equal
    }
}

impl Eq for Apfloat {}

impl fmt::Display for Apfloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }

        let s = self.m.magnitude().to_str_radix(self.radix);
        let sign = if self.signum() < 0 { "-" } else { "" };
        let scale = self.scale();
        let n = s.len() as i64;

        if scale >= 1 && scale == n {
            write!(f, "{}{}", sign, s)
        } else if scale >= 1 && scale < n {
            let (i, r) = s.split_at(scale as usize);
            write!(f, "{}{}.{}", sign, i, r)
        } else if scale > n && scale <= n + 15 {
            write!(f, "{}{}{}", sign, s, "0".repeat((scale - n) as usize))
        } else if scale <= 0 && scale > -6 {
            write!(f, "{}0.{}{}", sign, "0".repeat((-scale) as usize), s)
        } else if n == 1 {
            write!(f, "{}{}e{}", sign, s, scale - 1)
        } else {
            let (h, r) = s.split_at(1);
            write!(f, "{}{}.{}e{}", sign, h, r, scale - 1)
        }
    }
}

fn exp_from(v: i128) -> Result<i64, Error> {
    i64::try_from(v).map_err(|_| Error::Overflow)
}

pub(crate) fn radix_pow(radix: u32, k: u64) -> BigInt {
    debug_assert!(k <= u32::MAX as u64);
    BigInt::from(radix).pow(k as u32)
}

fn radix_pow_mag(radix: u32, k: u64) -> BigUint {
    debug_assert!(k <= u32::MAX as u64);
    BigUint::from(radix).pow(k as u32)
}

fn trim_zeros(mut m: BigInt, mut exp: i64, radix: u32) -> (BigInt, i64) {
    debug_assert!(!m.is_zero());

    let chunk = BigInt::from(radix).pow(16u32);
    loop {
        let (q, r) = m.div_rem(&chunk);
        if r.is_zero() {
            m = q;
            exp = exp.saturating_add(16);
        } else {
            break;
        }
    }

    let rad = BigInt::from(radix);
    loop {
        let (q, r) = m.div_rem(&rad);
        if r.is_zero() {
            m = q;
            exp = exp.saturating_add(1);
        } else {
            break;
        }
    }

    (m, exp)
}

fn digit_count(mag: &BigUint, radix: u32) -> u64 {
    debug_assert!(!mag.is_zero());

    if radix.is_power_of_two() {
        let k = radix.trailing_zeros() as u64;
        return (mag.bits() - 1) / k + 1;
    }

    let bits = mag.bits();
    let mut est = ((bits - 1) as f64 / (radix as f64).log2()) as u64;
    let mut pw = radix_pow_mag(radix, est);

    while pw > *mag {
        pw /= radix;
        est -= 1;
    }
    while pw <= *mag {
        pw *= radix;
        est += 1;
    }

    est
}
