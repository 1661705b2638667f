//! Precision management helpers.

use crate::defs::if_finite;
use crate::defs::Precision;
use crate::defs::EXTRA_PRECISION;
use crate::defs::INFINITE;
use crate::num::Apfloat;

/// Extends a precision by the standard working margin.
pub(crate) fn extend_precision(p: Precision) -> Precision {
    if_finite(p, p.saturating_add(EXTRA_PRECISION))
}

/// The value viewed with the standard working margin added to its precision.
pub(crate) fn extended(x: &Apfloat) -> Apfloat {
    x.with_precision(extend_precision(x.precision()))
}

/// The value viewed with `extra` digits added to its precision.
pub(crate) fn extended_by(x: &Apfloat, extra: Precision) -> Apfloat {
    x.with_precision(if_finite(
        x.precision(),
        x.precision().saturating_add(extra),
    ))
}

/// The value at precision `p` at least; a higher precision is kept.
pub(crate) fn ensure_precision(x: &Apfloat, p: Precision) -> Apfloat {
    if x.precision() < p {
        x.with_precision(p)
    } else {
        x.clone()
    }
}

/// Iteration plan for a Newton iteration that doubles the known precision at
/// every step, starting from a seed.
pub(crate) struct NewtonPlan {
    /// Steps needed to reach the target precision.
    pub iterations: u32,

    /// Step index at which the iteration is run twice to absorb accumulated
    /// round-off before the final truncation. The loop counts down; no step
    /// matches when doubling alone carries enough slack.
    pub precising: u32,
}

pub(crate) fn newton_plan(seed_precision: Precision, target_precision: Precision) -> NewtonPlan {
    let seed = seed_precision.max(1);

    let mut iterations = 0u32;
    let mut max_prec = seed;
    while max_prec < target_precision {
        max_prec = max_prec.saturating_mul(2);
        iterations += 1;
    }

    let mut precising = iterations;
    let mut min_prec = seed;
    while precising > 0 {
        let slack = min_prec as i128 - EXTRA_PRECISION as i128;
        if slack > 0 && shl_clamped(slack, precising) >= target_precision as i128 {
            break;
        }
        precising -= 1;
        min_prec = min_prec.saturating_mul(2);
    }

    NewtonPlan {
        iterations,
        precising,
    }
}

fn shl_clamped(v: i128, s: u32) -> i128 {
    debug_assert!(v > 0);
    if s >= 100 || v > i128::MAX >> s {
        i128::MAX
    } else {
        v << s
    }
}

/// Input and output precisions for `a*b + c*d` computed so that each product
/// carries only the digits that survive the final addition. A product
/// precision of zero means the product lies entirely below the last
/// significant digit of the other and is to be replaced by zero.
pub(crate) struct MatchedPrecisions {
    pub ab: Precision,
    pub cd: Precision,
    pub result: Precision,
}

pub(crate) fn matching_precisions(
    a: &Apfloat,
    b: &Apfloat,
    c: &Apfloat,
    d: &Apfloat,
) -> MatchedPrecisions {
    // the product scale is within one digit of the sum of the scales
    let ab = product_shape(a, b);
    let cd = product_shape(c, d);

    let lsd = match (ab, cd) {
        (Some((_, l1)), Some((_, l2))) => l1.max(l2),
        (Some((_, l)), None) | (None, Some((_, l))) => l,
        (None, None) => {
            return MatchedPrecisions {
                ab: 0,
                cd: 0,
                result: 1,
            }
        }
    };

    let p_ab = side_precision(ab, lsd);
    let p_cd = side_precision(cd, lsd);

    let result = if lsd == i128::MIN {
        INFINITE
    } else {
        let msd = ab
            .map(|(s, _)| s)
            .into_iter()
            .chain(cd.map(|(s, _)| s))
            .max()
            .unwrap_or(0);
        (msd - lsd + 1).clamp(1, (INFINITE - 1) as i128) as Precision
    };

    MatchedPrecisions {
        ab: p_ab,
        cd: p_cd,
        result,
    }
}

// (scale, last significant digit position) of a product, or None if it is zero.
fn product_shape(x: &Apfloat, y: &Apfloat) -> Option<(i128, i128)> {
    if x.is_zero() || y.is_zero() {
        return None;
    }

    let s = x.scale() as i128 + y.scale() as i128;
    let p = x.precision().min(y.precision());
    let lsd = if p == INFINITE {
        i128::MIN
    } else {
        s - p as i128
    };

    Some((s, lsd))
}

fn side_precision(side: Option<(i128, i128)>, lsd: i128) -> Precision {
    match side {
        None => 0,
        Some((s, own_lsd)) => {
            if lsd == i128::MIN {
                INFINITE
            } else if s < lsd {
                0
            } else {
                let available = if own_lsd == i128::MIN {
                    INFINITE
                } else {
                    (s - own_lsd).max(1) as Precision
                };
                (((s - lsd + 1).clamp(1, (INFINITE - 1) as i128)) as Precision).min(available)
            }
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_newton_plan() {
        // seed already covers the target
        let plan = newton_plan(15, 10);
        assert_eq!(plan.iterations, 0);

        let plan = newton_plan(15, 1000);
        assert_eq!(plan.iterations, 7);
        assert!(plan.precising <= plan.iterations);

        // 15 * 2^k grows past the target while (15 - 20) stays negative,
        // so a precising step is always scheduled somewhere below the top
        let plan = newton_plan(15, 1_000_000);
        assert_eq!(plan.iterations, 17);
        assert!(plan.precising < plan.iterations);
    }

    #[test]
    fn test_matching_precisions() {
        let a = Apfloat::from_i64(3, 30, 10).unwrap();
        let b = Apfloat::from_i64(5, 30, 10).unwrap();
        let z = Apfloat::zero(10).unwrap();

        let mp = matching_precisions(&a, &b, &z, &b);
        assert_eq!(mp.cd, 0);
        assert!(mp.ab >= 30);

        // a*b dominates c*d by more than the carried precision
        let tiny = Apfloat::parse("1e-100", 10, 10).unwrap();
        let mp = matching_precisions(&a, &b, &tiny, &tiny);
        assert_eq!(mp.cd, 0);

        let mp = matching_precisions(&a, &b, &b, &a);
        assert!(mp.ab >= 30 && mp.cd >= 30);
    }
}
