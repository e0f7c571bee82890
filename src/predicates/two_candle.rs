//! Two-candle predicates
//!
//! Arguments are `(current, previous)` where `previous` is the candle that
//! chronologically precedes `current`.

use super::{
    helpers::{nearly_equal, TWEEZER_TOLERANCE},
    single_candle::is_doji,
};
use crate::CandleFeatures;

// ============================================================
// ENGULFING
// ============================================================

/// Bullish body opens below and closes above the prior bearish body.
#[inline]
pub fn is_bullish_engulfing(current: &CandleFeatures, previous: &CandleFeatures) -> bool {
    previous.is_bearish
        && current.is_bullish
        && current.open < previous.close
        && current.close > previous.open
}

/// Bearish body opens above and closes below the prior bullish body.
#[inline]
pub fn is_bearish_engulfing(current: &CandleFeatures, previous: &CandleFeatures) -> bool {
    previous.is_bullish
        && current.is_bearish
        && current.open > previous.close
        && current.close < previous.open
}

// ============================================================
// HARAMI
// ============================================================

/// Bullish candle whose whole range sits inside the prior bearish body.
#[inline]
pub fn is_bullish_harami(current: &CandleFeatures, previous: &CandleFeatures) -> bool {
    previous.is_bearish
        && current.is_bullish
        && current.high < previous.open
        && current.low > previous.close
}

/// Bearish candle whose whole range sits inside the prior bullish body.
#[inline]
pub fn is_bearish_harami(current: &CandleFeatures, previous: &CandleFeatures) -> bool {
    previous.is_bullish
        && current.is_bearish
        && current.high < previous.close
        && current.low > previous.open
}

/// Either harami where the inner candle is itself a doji.
///
/// Doji-ness is judged against the inner candle's own range, not the
/// rolling baseline.
#[inline]
pub fn is_harami_cross(current: &CandleFeatures, previous: &CandleFeatures) -> bool {
    (is_bullish_harami(current, previous) || is_bearish_harami(current, previous))
        && is_doji(current)
}

// ============================================================
// PIERCING / DARK CLOUD COVER
// ============================================================

#[inline]
pub fn is_piercing_pattern(current: &CandleFeatures, previous: &CandleFeatures) -> bool {
    previous.is_bearish
        && current.is_bullish
        && current.open < previous.low
        && current.close > previous.close + previous.body_size / 2.0
}

#[inline]
pub fn is_dark_cloud_cover(current: &CandleFeatures, previous: &CandleFeatures) -> bool {
    previous.is_bullish
        && current.is_bearish
        && current.open > previous.high
        && current.close < previous.close - previous.body_size / 2.0
}

// ============================================================
// TWEEZERS
// ============================================================

/// Matching highs, bullish then bearish.
#[inline]
pub fn is_tweezer_tops(current: &CandleFeatures, previous: &CandleFeatures) -> bool {
    nearly_equal(current.high, previous.high, current.high, TWEEZER_TOLERANCE)
        && current.is_bearish
        && previous.is_bullish
}

/// Matching lows, bearish then bullish.
#[inline]
pub fn is_tweezer_bottoms(current: &CandleFeatures, previous: &CandleFeatures) -> bool {
    nearly_equal(current.low, previous.low, current.low, TWEEZER_TOLERANCE)
        && current.is_bullish
        && previous.is_bearish
}
