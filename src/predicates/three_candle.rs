//! Three-candle predicates
//!
//! Arguments are `(first, second, third)` in chronological order. The
//! inside/outside patterns reuse the two-candle harami and engulfing tests
//! on `(second, first)`.

use super::{
    helpers::{body_midpoint, STAR_BODY_FACTOR},
    two_candle::{
        is_bearish_engulfing, is_bearish_harami, is_bullish_engulfing, is_bullish_harami,
    },
};
use crate::CandleFeatures;

// ============================================================
// STARS
// ============================================================

/// Bearish candle, small-bodied star, bullish close above the first midpoint.
#[inline]
pub fn is_morning_star(
    first: &CandleFeatures,
    second: &CandleFeatures,
    third: &CandleFeatures,
) -> bool {
    first.is_bearish
        && second.body_size < STAR_BODY_FACTOR * first.body_size
        && third.is_bullish
        && third.close > body_midpoint(first.open, first.close)
}

/// Bullish candle, small-bodied star, bearish close below the first midpoint.
#[inline]
pub fn is_evening_star(
    first: &CandleFeatures,
    second: &CandleFeatures,
    third: &CandleFeatures,
) -> bool {
    first.is_bullish
        && second.body_size < STAR_BODY_FACTOR * first.body_size
        && third.is_bearish
        && third.close < body_midpoint(first.open, first.close)
}

// ============================================================
// SOLDIERS / CROWS
// ============================================================

#[inline]
pub fn is_three_white_soldiers(
    first: &CandleFeatures,
    second: &CandleFeatures,
    third: &CandleFeatures,
) -> bool {
    first.is_bullish
        && second.is_bullish
        && third.is_bullish
        && second.open > first.open
        && third.open > second.open
        && second.close > first.close
        && third.close > second.close
}

#[inline]
pub fn is_three_black_crows(
    first: &CandleFeatures,
    second: &CandleFeatures,
    third: &CandleFeatures,
) -> bool {
    first.is_bearish
        && second.is_bearish
        && third.is_bearish
        && second.open < first.open
        && third.open < second.open
        && second.close < first.close
        && third.close < second.close
}

// ============================================================
// THREE INSIDE / THREE OUTSIDE
// ============================================================

#[inline]
pub fn is_three_inside_up(
    first: &CandleFeatures,
    second: &CandleFeatures,
    third: &CandleFeatures,
) -> bool {
    first.is_bearish
        && is_bullish_harami(second, first)
        && third.is_bullish
        && third.close > second.high
}

#[inline]
pub fn is_three_inside_down(
    first: &CandleFeatures,
    second: &CandleFeatures,
    third: &CandleFeatures,
) -> bool {
    first.is_bullish
        && is_bearish_harami(second, first)
        && third.is_bearish
        && third.close < second.low
}

#[inline]
pub fn is_three_outside_up(
    first: &CandleFeatures,
    second: &CandleFeatures,
    third: &CandleFeatures,
) -> bool {
    first.is_bearish
        && is_bullish_engulfing(second, first)
        && third.is_bullish
        && third.close > second.high
}

#[inline]
pub fn is_three_outside_down(
    first: &CandleFeatures,
    second: &CandleFeatures,
    third: &CandleFeatures,
) -> bool {
    first.is_bullish
        && is_bearish_engulfing(second, first)
        && third.is_bearish
        && third.close < second.low
}
