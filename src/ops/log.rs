//! Natural logarithm by the arithmetic-geometric mean.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::debug;

use crate::defs::if_finite;
use crate::defs::Error;
use crate::defs::Precision;
use crate::defs::INFINITE;
use crate::num::Apfloat;
use crate::ops::agm::agm;
use crate::ops::other::scale;
use crate::ops::pi::pi_radix;
use crate::ops::util::extend_precision;
use crate::ops::util::extended;
use crate::ops::util::extended_by;

// Extra digits of the raw AGM evaluation beyond the standard margin.
const RAW_LOG_EXTRA: Precision = 25;

// The per-radix cache of ln(radix); the coordinator map only hands out tokens.
static LOG_CACHES: Lazy<Mutex<HashMap<u32, Arc<Mutex<Option<Apfloat>>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn log_cache(radix: u32) -> Arc<Mutex<Option<Apfloat>>> {
    let mut map = LOG_CACHES.lock();

    match map.entry(radix) {
        Entry::Occupied(e) => e.get().clone(),
        Entry::Vacant(v) => {
            let cache = Arc::new(Mutex::new(None));
            v.insert(cache.clone());

            cache
        }
    }
}

/// The natural logarithm of the radix itself, to `precision` digits. The value
/// is cached per radix and recomputed only when a higher precision is asked.
///
/// ## Errors
///
///  - InvalidPrecision: the precision is zero.
///  - InfinitePrecision: the precision is infinite.
///  - InvalidRadix: the radix is outside 2..=36.
pub fn log_radix(precision: Precision, radix: u32) -> Result<Apfloat, Error> {
    if precision == 0 {
        return Err(Error::InvalidPrecision(precision));
    }
    if precision == INFINITE {
        return Err(Error::InfinitePrecision("logarithm"));
    }

    let cache = log_cache(radix);
    let mut slot = cache.lock();

    if let Some(v) = &*slot {
        if v.precision() >= precision {
            return Ok(v.with_precision(precision));
        }
    }

    debug!(radix, precision, "computing log of radix");

    // ln(radix) = -ln(1/radix), and "0.1" is 1/radix in any radix
    let f = Apfloat::parse("0.1", precision, radix)?;
    let v = raw_log(&f)?.neg();

    *slot = Some(v.clone());

    Ok(v)
}

// Raw AGM logarithm: log(x) ~ pi*(agm(1, x') - agm(1, e)) / (2*agm(1, e)*agm(1, x'))
// with e = radix^-n and x' = x*radix^-n. Accurate for values with scale near
// zero; the public entry separates the scale out first.
pub(crate) fn raw_log(x: &Apfloat) -> Result<Apfloat, Error> {
    debug_assert!(x.signum() > 0);

    let target = x.precision();
    if target == INFINITE {
        return Err(Error::InfinitePrecision("logarithm"));
    }

    let radix = x.radix();
    let working = extend_precision(target);
    let n = (target / 2 + RAW_LOG_EXTRA) as i64; // rough estimate

    let x = extended_by(x, RAW_LOG_EXTRA);
    let one = Apfloat::one(radix)?;

    let e = scale(&one.with_precision(working), -n)?;
    let x = scale(&x, -n)?;

    let agme = extended(&agm(&one, &e)?);
    let agmex = extended(&agm(&one, &x)?);

    let pi = extended(&pi_radix(target, radix)?);
    let two = Apfloat::from_i64(2, INFINITE, radix)?;

    let log = pi
        .mul(&agmex.sub(&agme)?)?
        .div(&two.mul(&agme)?.mul(&agmex)?)?;

    Ok(log.with_precision(target))
}

impl Apfloat {
    /// Natural logarithm.
    ///
    /// The computation splits the argument as `m * radix^s` and combines
    /// `rawLog(m)` with the cached `s * ln(radix)`. An argument close to one
    /// loses significance in proportion to the digits it shares with one.
    ///
    /// ## Errors
    ///
    ///  - Domain: the argument is zero or negative.
    ///  - InfinitePrecision: the precision is infinite.
    pub fn ln(&self) -> Result<Self, Error> {
        if self.signum() <= 0 {
            return Err(Error::Domain(if self.is_zero() {
                "logarithm of zero"
            } else {
                "logarithm of negative number; result would be complex"
            }));
        }
        if self.is_one() {
            return Apfloat::zero(self.radix());
        }

        let target = self.precision();
        if target == INFINITE {
            return Err(Error::InfinitePrecision("logarithm"));
        }

        let one = Apfloat::one(self.radix())?;
        let final_precision = if_finite(
            target,
            target.saturating_sub(one.equal_digits(self)).max(1),
        );

        let s = self.scale();
        let x = scale(self, -s)?;

        let radix_power = if s == 0 {
            Apfloat::zero(self.radix())?
        } else {
            let log_r = extended(&log_radix(target, self.radix())?);
            Apfloat::from_i64(s, INFINITE, self.radix())?.mul(&log_r)?
        };

        Ok(extended(&raw_log(&x)?)
            .add(&radix_power)?
            .with_precision(final_precision))
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_ln() {
        let p = 30;
        let ten = Apfloat::from_i64(10, p, 10).unwrap();
        let r = ten.ln().unwrap();
        let refv = Apfloat::parse("2.30258509299404568401799145468", p, 10).unwrap();
        assert!(r.equal_digits(&refv) >= p - 2);

        let two = Apfloat::from_i64(2, p, 10).unwrap();
        let r = two.ln().unwrap();
        let refv = Apfloat::parse("0.693147180559945309417232121458", p, 10).unwrap();
        assert!(r.equal_digits(&refv) >= p - 2);

        assert!(Apfloat::zero(10).unwrap().ln().is_err());
        assert!(two.neg().ln().is_err());
        assert!(Apfloat::one(10).unwrap().ln().unwrap().is_zero());
        assert!(Apfloat::from_i64(2, INFINITE, 10).unwrap().ln().is_err());
    }

    #[test]
    fn test_ln_additivity() {
        // log(x*y) == log(x) + log(y)
        let p = 25;
        let x = Apfloat::parse("3.5", p, 10).unwrap();
        let y = Apfloat::parse("7.25", p, 10).unwrap();

        let a = x.mul(&y).unwrap().ln().unwrap();
        let b = x.ln().unwrap().add(&y.ln().unwrap()).unwrap();
        assert!(a.equal_digits(&b) >= p - 3);
    }

    #[test]
    fn test_ln_small_argument() {
        // scale separation handles values far from one
        let p = 25;
        let x = Apfloat::parse("2.5e-10", p, 10).unwrap();
        let r = x.ln().unwrap();
        let refv = Apfloat::parse("-22.1095601980663017749963873", p, 10).unwrap();
        assert!(r.equal_digits(&refv) >= p - 3);
    }

    #[test]
    fn test_log_radix() {
        let p = 30;
        let r = log_radix(p, 10).unwrap();
        let refv = Apfloat::parse("2.30258509299404568401799145468", p, 10).unwrap();
        assert!(r.equal_digits(&refv) >= p - 2);

        // the cache serves lower precisions by truncation
        let r2 = log_radix(10, 10).unwrap();
        assert_eq!(r2.precision(), 10);
        assert!(r2.equal_digits(&refv.with_precision(10)) >= 8);

        assert!(log_radix(0, 10).is_err());
        assert!(log_radix(INFINITE, 10).is_err());

        // ln(2) in binary
        let r = log_radix(20, 2).unwrap();
        let refv = Apfloat::parse("0.10110001011100100001", 20, 2).unwrap();
        assert!(r.equal_digits(&refv) >= 17);
    }
}
