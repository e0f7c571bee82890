//! Single-candle predicates
//!
//! Doji family, hammer family, spinning top and marubozu. Doji shapes are
//! judged against the candle's own range; the others against the rolling
//! average body size carried in [`CandleFeatures::avg_body_size`].

use super::helpers::{
    above, at_most, below, DOJI_FACTOR, LONG_LEG_FACTOR, MARUBOZU_SHADOW_FACTOR,
    SHADOW_TIGHT_FACTOR, SHADOW_VERYLONG_FACTOR, BODY_LONG_FACTOR,
};
use crate::{CandleFeatures, PatternLabel};

// ============================================================
// DOJI FAMILY
// ============================================================

/// Body is negligible relative to the candle's own range.
#[inline]
pub fn is_doji(c: &CandleFeatures) -> bool {
    at_most(c.body_size, c.total_size, DOJI_FACTOR)
}

#[inline]
pub fn is_dragonfly_doji(c: &CandleFeatures) -> bool {
    is_doji(c)
        && at_most(c.upper_shadow, c.total_size, SHADOW_TIGHT_FACTOR)
        && c.lower_shadow > SHADOW_VERYLONG_FACTOR * c.body_size
}

#[inline]
pub fn is_gravestone_doji(c: &CandleFeatures) -> bool {
    is_doji(c)
        && at_most(c.lower_shadow, c.total_size, SHADOW_TIGHT_FACTOR)
        && c.upper_shadow > SHADOW_VERYLONG_FACTOR * c.body_size
}

#[inline]
pub fn is_long_legged_doji(c: &CandleFeatures) -> bool {
    is_doji(c)
        && above(c.upper_shadow, c.total_size, LONG_LEG_FACTOR)
        && above(c.lower_shadow, c.total_size, LONG_LEG_FACTOR)
}

/// Doji with both shadows tight against the body.
///
/// Unreachable for a positive range (body and shadows sum to the range);
/// kept so the family priority order stays explicit.
#[inline]
fn is_tight_doji(c: &CandleFeatures) -> bool {
    at_most(c.upper_shadow, c.total_size, SHADOW_TIGHT_FACTOR)
        && at_most(c.lower_shadow, c.total_size, SHADOW_TIGHT_FACTOR)
}

/// Picks at most one label from the Doji family.
///
/// Priority: Dragonfly, Gravestone, tight plain Doji, Long-legged, then
/// plain Doji as the fallback for any remaining doji body.
pub fn classify_doji(c: &CandleFeatures) -> Option<PatternLabel> {
    if !is_doji(c) {
        return None;
    }

    let label = if is_dragonfly_doji(c) {
        PatternLabel::DragonflyDoji
    } else if is_gravestone_doji(c) {
        PatternLabel::GravestoneDoji
    } else if is_tight_doji(c) {
        PatternLabel::Doji
    } else if is_long_legged_doji(c) {
        PatternLabel::LongLeggedDoji
    } else {
        PatternLabel::Doji
    };

    Some(label)
}

// ============================================================
// HAMMER FAMILY
// ============================================================

/// Long lower shadow, short upper shadow, small body.
#[inline]
fn hammer_geometry(c: &CandleFeatures) -> bool {
    let avg = c.avg_body_size;
    above(c.lower_shadow, avg, SHADOW_VERYLONG_FACTOR)
        && below(c.upper_shadow, avg, 1.0)
        && below(c.body_size, avg, 1.0)
}

/// Long upper shadow, short lower shadow, small body.
#[inline]
fn inverted_hammer_geometry(c: &CandleFeatures) -> bool {
    let avg = c.avg_body_size;
    above(c.upper_shadow, avg, SHADOW_VERYLONG_FACTOR)
        && below(c.lower_shadow, avg, 1.0)
        && below(c.body_size, avg, 1.0)
}

#[inline]
pub fn is_hammer(c: &CandleFeatures) -> bool {
    hammer_geometry(c)
}

#[inline]
pub fn is_inverted_hammer(c: &CandleFeatures) -> bool {
    inverted_hammer_geometry(c)
}

/// Hammer shape closing lower than it opened.
#[inline]
pub fn is_hanging_man(c: &CandleFeatures) -> bool {
    hammer_geometry(c) && c.is_bearish
}

/// Inverted hammer shape closing lower than it opened.
#[inline]
pub fn is_shooting_star(c: &CandleFeatures) -> bool {
    inverted_hammer_geometry(c) && c.is_bearish
}

// ============================================================
// SPINNING TOP / MARUBOZU
// ============================================================

#[inline]
pub fn is_spinning_top(c: &CandleFeatures) -> bool {
    let avg = c.avg_body_size;
    above(c.upper_shadow, avg, 1.0)
        && above(c.lower_shadow, avg, 1.0)
        && below(c.body_size, avg, 1.0)
}

/// Large body with negligible shadows on both ends.
#[inline]
fn marubozu_geometry(c: &CandleFeatures) -> bool {
    above(c.body_size, c.avg_body_size, BODY_LONG_FACTOR)
        && c.upper_shadow < MARUBOZU_SHADOW_FACTOR * c.body_size
        && c.lower_shadow < MARUBOZU_SHADOW_FACTOR * c.body_size
}

#[inline]
pub fn is_bullish_marubozu(c: &CandleFeatures) -> bool {
    marubozu_geometry(c) && c.is_bullish
}

#[inline]
pub fn is_bearish_marubozu(c: &CandleFeatures) -> bool {
    marubozu_geometry(c) && c.is_bearish
}
