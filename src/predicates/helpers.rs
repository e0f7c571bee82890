//! Fixed thresholds and guarded comparisons shared by all predicate modules.
//!
//! Every comparison scaled by a candle's own range or by a rolling baseline
//! goes through [`at_most`], [`below`] or [`above`], which report `false`
//! when the base is not strictly positive. Comparisons scaled by a body size
//! are plain multiplications because a zero body is a meaningful shape.

// ============================================================
// THRESHOLDS
// ============================================================

/// Body is doji-like: body_size <= total_size * DOJI_FACTOR
pub const DOJI_FACTOR: f64 = 0.1;
/// Shadow is negligible relative to the candle's range
pub const SHADOW_TIGHT_FACTOR: f64 = 0.1;
/// Both shadows of a long-legged doji exceed this share of the range
pub const LONG_LEG_FACTOR: f64 = 0.2;
/// Shadow is very long: shadow > base * SHADOW_VERYLONG_FACTOR
pub const SHADOW_VERYLONG_FACTOR: f64 = 2.0;
/// Marubozu body must exceed the baseline body by this factor
pub const BODY_LONG_FACTOR: f64 = 2.0;
/// Marubozu shadows must stay below this share of the body
pub const MARUBOZU_SHADOW_FACTOR: f64 = 0.1;
/// Star body must be smaller than this share of the first body
pub const STAR_BODY_FACTOR: f64 = 0.5;
/// Tweezer extremes are "equal" within this share of the price
pub const TWEEZER_TOLERANCE: f64 = 0.1;

// ============================================================
// GUARDED COMPARISONS
// ============================================================

/// `value <= base * factor`, false unless `base > 0`.
#[inline]
pub fn at_most(value: f64, base: f64, factor: f64) -> bool {
    base > 0.0 && value <= base * factor
}

/// `value < base * factor`, false unless `base > 0`.
#[inline]
pub fn below(value: f64, base: f64, factor: f64) -> bool {
    base > 0.0 && value < base * factor
}

/// `value > base * factor`, false unless `base > 0`.
#[inline]
pub fn above(value: f64, base: f64, factor: f64) -> bool {
    base > 0.0 && value > base * factor
}

/// `|a - b| < reference * tolerance`, false unless `reference > 0`.
#[inline]
pub fn nearly_equal(a: f64, b: f64, reference: f64, tolerance: f64) -> bool {
    below((a - b).abs(), reference, tolerance)
}

/// Midpoint of a candle's real body.
#[inline]
pub fn body_midpoint(open: f64, close: f64) -> f64 {
    (open + close) / 2.0
}
