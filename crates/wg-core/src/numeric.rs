use crate::WgError;

/// Floating point type for rates, factors and targets.
pub type Real = f64;

/// Guide-rate sums below this are treated as "nothing to share".
pub const GUIDE_RATE_EPSILON: Real = 1e-12;

/// Floor applied to constraint target rates after reductions.
pub const MIN_TARGET_RATE: Real = 1e-12;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, WgError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(WgError::NonFinite { what, value: v })
    }
}

/// `num / den`, or 0 when `den` does not exceed `eps`.
#[inline]
pub fn guarded_ratio(num: Real, den: Real, eps: Real) -> Real {
    if den > eps { num / den } else { 0.0 }
}
