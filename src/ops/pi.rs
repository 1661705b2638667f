//! Pi by the Chudnovskys' binary splitting formula, cached per radix.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::debug;

use crate::ctx::default_radix;
use crate::defs::Error;
use crate::defs::Precision;
use crate::defs::INFINITE;
use crate::num::Apfloat;
use crate::ops::util::extend_precision;

// Decimal digits of pi gained per series term is 14.18...; this is its
// natural logarithm form, valid for any radix.
const DIGITS_PER_TERM: f64 = 32.65445004177;

// Per-radix integer constants of the series terms, at infinite precision.
struct PiTerms {
    radix: u32,
    a: Apfloat,
    b: Apfloat,
    j: Apfloat,
    one: Apfloat,
    two: Apfloat,
    five: Apfloat,
    six: Apfloat,
}

impl PiTerms {
    fn new(radix: u32) -> Result<Self, Error> {
        Ok(PiTerms {
            radix,
            a: Apfloat::from_i64(13591409, INFINITE, radix)?,
            b: Apfloat::from_i64(545140134, INFINITE, radix)?,
            j: Apfloat::from_i64(10939058860032000, INFINITE, radix)?,
            one: Apfloat::from_i64(1, INFINITE, radix)?,
            two: Apfloat::from_i64(2, INFINITE, radix)?,
            five: Apfloat::from_i64(5, INFINITE, radix)?,
            six: Apfloat::from_i64(6, INFINITE, radix)?,
        })
    }

    // a(n) = (A + B*n) * (-1)^n
    fn a(&self, n: i64) -> Result<Apfloat, Error> {
        let f = Apfloat::from_i64(n, INFINITE, self.radix)?;
        let v = self.a.add(&self.b.mul(&f)?)?;

        Ok(if n & 1 == 0 { v } else { v.neg() })
    }

    // p(0) = 1, p(n) = (6n-1)(2n-1)(6n-5)
    fn p(&self, n: i64) -> Result<Apfloat, Error> {
        if n == 0 {
            return Ok(self.one.clone());
        }

        let f = Apfloat::from_i64(n, INFINITE, self.radix)?;
        let sixf = self.six.mul(&f)?;

        sixf.sub(&self.one)?
            .mul(&self.two.mul(&f)?.sub(&self.one)?)?
            .mul(&sixf.sub(&self.five)?)
    }

    // q(0) = 1, q(n) = J * n^3
    fn q(&self, n: i64) -> Result<Apfloat, Error> {
        if n == 0 {
            return Ok(self.one.clone());
        }

        let f = Apfloat::from_i64(n, INFINITE, self.radix)?;

        self.j.mul(&f)?.mul(&f)?.mul(&f)
    }

    // Binary splitting over [n1, n2). The result (T, Q, P) is exact; short
    // ranges are unrolled because the leaves dominate the term count.
    fn split(&self, n1: i64, n2: i64) -> Result<(Apfloat, Apfloat, Apfloat), Error> {
        debug_assert!(n1 < n2);

        match n2 - n1 {
            1 => {
                let p0 = self.p(n1)?;
                let t = self.a(n1)?.mul(&p0)?;

                Ok((t, self.q(n1)?, p0))
            }
            2 => {
                let p0 = self.p(n1)?;
                let p01 = p0.mul(&self.p(n1 + 1)?)?;
                let q1 = self.q(n1 + 1)?;

                let t = q1
                    .mul(&self.a(n1)?)?
                    .mul(&p0)?
                    .add(&self.a(n1 + 1)?.mul(&p01)?)?;

                Ok((t, self.q(n1)?.mul(&q1)?, p01))
            }
            3 => {
                let p0 = self.p(n1)?;
                let p01 = p0.mul(&self.p(n1 + 1)?)?;
                let p012 = p01.mul(&self.p(n1 + 2)?)?;
                let q2 = self.q(n1 + 2)?;
                let q12 = self.q(n1 + 1)?.mul(&q2)?;

                let t = q12
                    .mul(&self.a(n1)?)?
                    .mul(&p0)?
                    .add(&q2.mul(&self.a(n1 + 1)?)?.mul(&p01)?)?
                    .add(&self.a(n1 + 2)?.mul(&p012)?)?;

                Ok((t, self.q(n1)?.mul(&q12)?, p012))
            }
            4 => {
                let p0 = self.p(n1)?;
                let p01 = p0.mul(&self.p(n1 + 1)?)?;
                let p012 = p01.mul(&self.p(n1 + 2)?)?;
                let p0123 = p012.mul(&self.p(n1 + 3)?)?;
                let q3 = self.q(n1 + 3)?;
                let q23 = self.q(n1 + 2)?.mul(&q3)?;
                let q123 = self.q(n1 + 1)?.mul(&q23)?;

                let t = q123
                    .mul(&self.a(n1)?)?
                    .mul(&p0)?
                    .add(&q23.mul(&self.a(n1 + 1)?)?.mul(&p01)?)?
                    .add(&q3.mul(&self.a(n1 + 2)?)?.mul(&p012)?)?
                    .add(&self.a(n1 + 3)?.mul(&p0123)?)?;

                Ok((t, self.q(n1)?.mul(&q123)?, p0123))
            }
            _ => {
                let mid = n1 + (n2 - n1) / 2;

                let (lt, lq, lp) = self.split(n1, mid)?;
                let (rt, rq, rp) = self.split(mid, n2)?;

                let t = rq.mul(&lt)?.add(&lp.mul(&rt)?)?;

                Ok((t, lq.mul(&rq)?, lp.mul(&rp)?))
            }
        }
    }
}

// State published after a successful computation.
struct PiState {
    pi: Apfloat,
    t: Apfloat,
    q: Apfloat,
    p: Apfloat,
    term_count: i64,
    inv_sqrt: Apfloat,
}

struct PiCache {
    terms: PiTerms,
    computed: Option<PiState>,
}

// The coordinator map only hands out the per-radix token; all cache state is
// read and written under that token, so work at one radix never blocks another.
static PI_CACHES: Lazy<Mutex<HashMap<u32, Arc<Mutex<PiCache>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn pi_cache(radix: u32) -> Result<Arc<Mutex<PiCache>>, Error> {
    let mut map = PI_CACHES.lock();

    match map.entry(radix) {
        Entry::Occupied(e) => Ok(e.get().clone()),
        Entry::Vacant(v) => {
            let cache = Arc::new(Mutex::new(PiCache {
                terms: PiTerms::new(radix)?,
                computed: None,
            }));
            v.insert(cache.clone());

            Ok(cache)
        }
    }
}

/// The value of π to `precision` digits in the process-wide default radix.
///
/// ## Errors
///
///  - InvalidPrecision: the precision is zero.
///  - InfinitePrecision: the precision is infinite.
pub fn pi(precision: Precision) -> Result<Apfloat, Error> {
    pi_radix(precision, default_radix())
}

/// The value of π to `precision` digits in the given radix.
///
/// Computed terms, the partial series triple, and the inverse square root of
/// 640320 are cached per radix, so a later request at a higher precision only
/// computes the series tail.
///
/// ## Errors
///
///  - InvalidPrecision: the precision is zero.
///  - InfinitePrecision: the precision is infinite.
///  - InvalidRadix: the radix is outside 2..=36.
pub fn pi_radix(precision: Precision, radix: u32) -> Result<Apfloat, Error> {
    if precision == 0 {
        return Err(Error::InvalidPrecision(precision));
    }
    if precision == INFINITE {
        return Err(Error::InfinitePrecision("pi"));
    }

    let cache = pi_cache(radix)?;
    let mut cache = cache.lock();

    if let Some(state) = &cache.computed {
        if state.pi.precision() >= precision {
            return Ok(state.pi.with_precision(precision));
        }
    }

    calculate_pi(precision, &mut cache)
}

// pi = (1/sqrt(640320)) * (1/T) * 53360 * Q, with (T, Q, P) from the series.
// The cache is updated only once the whole computation has succeeded.
fn calculate_pi(precision: Precision, cache: &mut PiCache) -> Result<Apfloat, Error> {
    let radix = cache.terms.radix;
    let needed_terms = (precision as f64 * (radix as f64).ln() / DIGITS_PER_TERM) as i64;
    let working = extend_precision(precision);

    let (lt, lq, lp, term_count, guess) = match &cache.computed {
        Some(state) => {
            let mut lt = state.t.clone();
            let mut lq = state.q.clone();
            let mut lp = state.p.clone();
            let mut term_count = state.term_count;

            if needed_terms + 1 > term_count {
                debug!(radix, have = term_count, need = needed_terms + 1, "extending pi series");

                let (rt, rq, rp) = cache.terms.split(term_count, needed_terms + 1)?;

                lt = rq.mul(&lt)?.add(&lp.mul(&rt)?)?;
                lq = lq.mul(&rq)?;
                lp = lp.mul(&rp)?;
                term_count = needed_terms + 1;
            }

            (lt, lq, lp, term_count, Some(state.inv_sqrt.clone()))
        }
        None => {
            debug!(radix, need = needed_terms + 1, "computing pi series");

            let (t, q, p) = cache.terms.split(0, needed_terms + 1)?;

            (t, q, p, needed_terms + 1, None)
        }
    };

    // the prior inverse root extends quadratically to the new precision
    let base = Apfloat::from_i64(640320, working, radix)?;
    let inv_sqrt = base.inverse_root_seeded(2, working, guess.as_ref())?;

    let pi = inv_sqrt
        .mul(&lt)?
        .inverse_root_prec(1, working)?
        .mul(&Apfloat::from_i64(53360, INFINITE, radix)?)?
        .mul(&lq)?;

    let pi = pi.with_precision(precision);
    let inv_sqrt = inv_sqrt.with_precision(precision);

    cache.computed = Some(PiState {
        pi: pi.clone(),
        t: lt,
        q: lq,
        p: lp,
        term_count,
        inv_sqrt,
    });

    Ok(pi)
}

#[cfg(test)]
pub(crate) fn cached_term_count(radix: u32) -> Option<i64> {
    PI_CACHES
        .lock()
        .get(&radix)
        .and_then(|c| c.lock().computed.as_ref().map(|s| s.term_count))
}

#[cfg(test)]
mod tests {

    use super::*;

    const PI_50: &str = "3.1415926535897932384626433832795028841971693993751";

    #[test]
    fn test_pi_value() {
        let p = 50;
        let r = pi_radix(p, 10).unwrap();
        let refv = Apfloat::parse(PI_50, p, 10).unwrap();
        assert!(r.equal_digits(&refv) >= p - 1);
        assert_eq!(r.precision(), p);
    }

    #[test]
    fn test_pi_cache_extension() {
        // use a radix no other test touches so the cache starts cold
        let r1 = pi_radix(100, 7).unwrap();
        let t1 = cached_term_count(7).unwrap();

        let r2 = pi_radix(200, 7).unwrap();
        let t2 = cached_term_count(7).unwrap();
        assert!(t2 > t1);

        // published values agree at the common precision
        assert!(r2.with_precision(100).equal_digits(&r1) >= 98);

        // a lower-precision request only truncates
        let r3 = pi_radix(50, 7).unwrap();
        assert_eq!(cached_term_count(7).unwrap(), t2);
        assert!(r3.equal_digits(&r2.with_precision(50)) >= 48);
    }

    #[test]
    fn test_pi_binary_radix() {
        // pi in binary: 11.001001000011111101101010100010001000010110100011
        let p = 40;
        let r = pi_radix(p, 2).unwrap();
        let refv =
            Apfloat::parse("11.00100100001111110110101010001000100001", p, 2).unwrap();
        assert!(r.equal_digits(&refv) >= p - 2);
    }

    #[test]
    fn test_pi_errors() {
        assert!(pi_radix(0, 10).is_err());
        assert!(pi_radix(INFINITE, 10).is_err());
        assert!(pi_radix(10, 1).is_err());
        assert!(pi_radix(10, 37).is_err());
    }

    #[test]
    fn test_default_radix_entry() {
        let r = pi(30).unwrap();
        assert_eq!(r.radix(), crate::ctx::default_radix());
    }
}
