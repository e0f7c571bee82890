//! Candlestick predicates and the rule tables the engine evaluates
//!
//! # Tiers
//!
//! - **Single-candle**: Doji family (mutually exclusive), Hammer family,
//!   Spinning Top, Marubozu
//! - **Two-candle**: Engulfing, Harami, Harami Cross, Piercing / Dark Cloud
//!   Cover, Tweezers
//! - **Three-candle**: Stars, Soldiers / Crows, Three Inside, Three Outside
//!
//! Each predicate is a plain `fn` over [`CandleFeatures`]. A [`Rule`] pairs a
//! predicate with the label it emits, and the default tables below list the
//! rules in output order.

pub mod helpers;
pub mod single_candle;
pub mod three_candle;
pub mod two_candle;

pub use helpers::*;
pub use single_candle::*;
pub use three_candle::*;
pub use two_candle::*;

use crate::{label::Arity, CandleFeatures, PatternLabel};

/// Test over the tail of a feature sequence.
#[derive(Clone, Copy)]
pub enum Predicate {
    /// `(candle)`
    Single(fn(&CandleFeatures) -> bool),
    /// `(current, previous)`
    Pair(fn(&CandleFeatures, &CandleFeatures) -> bool),
    /// `(first, second, third)`
    Triple(fn(&CandleFeatures, &CandleFeatures, &CandleFeatures) -> bool),
    /// Single-candle family where at most one member may match.
    Classify(fn(&CandleFeatures) -> Option<PatternLabel>),
}

impl Predicate {
    #[inline]
    pub fn arity(&self) -> Arity {
        match self {
            Self::Single(_) | Self::Classify(_) => Arity::Single,
            Self::Pair(_) => Arity::Two,
            Self::Triple(_) => Arity::Three,
        }
    }
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Single(_) => "Single",
            Self::Pair(_) => "Pair",
            Self::Triple(_) => "Triple",
            Self::Classify(_) => "Classify",
        };
        f.write_str(kind)
    }
}

/// One entry of the rule table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Emitted on match. For [`Predicate::Classify`] this names the family
    /// and the classifier picks the concrete member.
    pub label: PatternLabel,
    pub predicate: Predicate,
}

impl Rule {
    pub const fn single(label: PatternLabel, test: fn(&CandleFeatures) -> bool) -> Self {
        Self { label, predicate: Predicate::Single(test) }
    }

    pub const fn pair(
        label: PatternLabel,
        test: fn(&CandleFeatures, &CandleFeatures) -> bool,
    ) -> Self {
        Self { label, predicate: Predicate::Pair(test) }
    }

    pub const fn triple(
        label: PatternLabel,
        test: fn(&CandleFeatures, &CandleFeatures, &CandleFeatures) -> bool,
    ) -> Self {
        Self { label, predicate: Predicate::Triple(test) }
    }

    pub const fn classify(
        family: PatternLabel,
        classify: fn(&CandleFeatures) -> Option<PatternLabel>,
    ) -> Self {
        Self { label: family, predicate: Predicate::Classify(classify) }
    }

    #[inline]
    pub fn arity(&self) -> Arity {
        self.predicate.arity()
    }

    /// Evaluate against the last `arity` records of `tail`.
    ///
    /// Returns `None` when `tail` is too short for this rule.
    #[inline]
    pub fn evaluate(&self, tail: &[CandleFeatures]) -> Option<PatternLabel> {
        let n = tail.len();
        if n < self.arity().candles() {
            return None;
        }

        match self.predicate {
            Predicate::Single(test) => test(&tail[n - 1]).then_some(self.label),
            Predicate::Classify(classify) => classify(&tail[n - 1]),
            Predicate::Pair(test) => test(&tail[n - 1], &tail[n - 2]).then_some(self.label),
            Predicate::Triple(test) => {
                test(&tail[n - 3], &tail[n - 2], &tail[n - 1]).then_some(self.label)
            }
        }
    }
}

// ============================================================
// DEFAULT RULE TABLES
// ============================================================

/// Single-candle rules in output order.
pub fn single_candle_rules() -> [Rule; 8] {
    use PatternLabel as L;
    [
        Rule::classify(L::Doji, classify_doji),
        Rule::single(L::Hammer, is_hammer),
        Rule::single(L::InvertedHammer, is_inverted_hammer),
        Rule::single(L::HangingMan, is_hanging_man),
        Rule::single(L::ShootingStar, is_shooting_star),
        Rule::single(L::SpinningTop, is_spinning_top),
        Rule::single(L::BullishMarubozu, is_bullish_marubozu),
        Rule::single(L::BearishMarubozu, is_bearish_marubozu),
    ]
}

/// Two-candle rules in output order.
pub fn two_candle_rules() -> [Rule; 9] {
    use PatternLabel as L;
    [
        Rule::pair(L::BullishEngulfing, is_bullish_engulfing),
        Rule::pair(L::BearishEngulfing, is_bearish_engulfing),
        Rule::pair(L::BullishHarami, is_bullish_harami),
        Rule::pair(L::BearishHarami, is_bearish_harami),
        Rule::pair(L::HaramiCross, is_harami_cross),
        Rule::pair(L::PiercingPattern, is_piercing_pattern),
        Rule::pair(L::DarkCloudCover, is_dark_cloud_cover),
        Rule::pair(L::TweezerTops, is_tweezer_tops),
        Rule::pair(L::TweezerBottoms, is_tweezer_bottoms),
    ]
}

/// Three-candle rules in output order.
pub fn three_candle_rules() -> [Rule; 8] {
    use PatternLabel as L;
    [
        Rule::triple(L::MorningStar, is_morning_star),
        Rule::triple(L::EveningStar, is_evening_star),
        Rule::triple(L::ThreeWhiteSoldiers, is_three_white_soldiers),
        Rule::triple(L::ThreeBlackCrows, is_three_black_crows),
        Rule::triple(L::ThreeInsideUp, is_three_inside_up),
        Rule::triple(L::ThreeInsideDown, is_three_inside_down),
        Rule::triple(L::ThreeOutsideUp, is_three_outside_up),
        Rule::triple(L::ThreeOutsideDown, is_three_outside_down),
    ]
}
