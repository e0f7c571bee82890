//! Pattern label vocabulary
//!
//! [`PatternLabel`] is the closed set of names the engine can emit. The
//! string form (`as_str`, `Display`, serde) is the human-readable pattern
//! name, e.g. `"Dragonfly Doji"`.

use std::{fmt, str::FromStr};

use crate::PatternError;

/// Direction/bias of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Bullish,
    Neutral,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }
}

/// Number of consecutive candles a pattern spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Arity {
    Single,
    Two,
    Three,
}

impl Arity {
    pub const ALL: [Arity; 3] = [Arity::Single, Arity::Two, Arity::Three];

    #[inline]
    pub const fn candles(self) -> usize {
        match self {
            Arity::Single => 1,
            Arity::Two => 2,
            Arity::Three => 3,
        }
    }
}

/// Generates the label enum together with its string table, arity,
/// direction and description lookups.
macro_rules! define_labels {
    (
        $(
            $variant:ident => $name:literal, $arity:ident, $direction:ident, $description:literal;
        )*
    ) => {
        /// A candlestick pattern name
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum PatternLabel {
            $(
                #[serde(rename = $name)]
                $variant,
            )*
        }

        impl PatternLabel {
            /// Every label, in the order the engine emits them.
            pub const ALL: &'static [PatternLabel] = &[$(PatternLabel::$variant),*];

            #[inline]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(PatternLabel::$variant => $name),*
                }
            }

            #[inline]
            pub const fn arity(self) -> Arity {
                match self {
                    $(PatternLabel::$variant => Arity::$arity),*
                }
            }

            /// Typical signal of the pattern, independent of market context.
            #[inline]
            pub const fn typical_direction(self) -> Direction {
                match self {
                    $(PatternLabel::$variant => Direction::$direction),*
                }
            }

            pub const fn description(self) -> &'static str {
                match self {
                    $(PatternLabel::$variant => $description),*
                }
            }
        }

        impl FromStr for PatternLabel {
            type Err = PatternError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(PatternLabel::$variant),)*
                    other => Err(PatternError::UnknownPattern(other.to_string())),
                }
            }
        }
    };
}

define_labels! {
    // Single candle
    Doji => "Doji", Single, Neutral,
        "A doji occurs when the open and close prices are virtually equal, indicating indecision in the market.";
    DragonflyDoji => "Dragonfly Doji", Single, Bullish,
        "A doji with a long lower shadow and virtually no upper shadow.";
    GravestoneDoji => "Gravestone Doji", Single, Bearish,
        "A doji with a long upper shadow and virtually no lower shadow.";
    LongLeggedDoji => "Long-legged Doji", Single, Neutral,
        "A doji with long upper and lower shadows.";
    Hammer => "Hammer", Single, Bullish,
        "A bullish reversal pattern with a small body at the top and a long lower shadow.";
    InvertedHammer => "Inverted Hammer", Single, Bullish,
        "A bullish reversal pattern with a small body at the bottom and a long upper shadow.";
    HangingMan => "Hanging Man", Single, Bearish,
        "A bearish reversal pattern that looks like a hammer but appears after an uptrend.";
    ShootingStar => "Shooting Star", Single, Bearish,
        "A bearish reversal pattern with a small body at the bottom and a long upper shadow.";
    SpinningTop => "Spinning Top", Single, Neutral,
        "A pattern indicating indecision with small body and long shadows.";
    BullishMarubozu => "Bullish Marubozu", Single, Bullish,
        "A strong bullish candle with no shadows.";
    BearishMarubozu => "Bearish Marubozu", Single, Bearish,
        "A strong bearish candle with no shadows.";

    // Two candle
    BullishEngulfing => "Bullish Engulfing", Two, Bullish,
        "A bullish reversal pattern where the current candle completely engulfs the previous bearish candle.";
    BearishEngulfing => "Bearish Engulfing", Two, Bearish,
        "A bearish reversal pattern where the current candle completely engulfs the previous bullish candle.";
    BullishHarami => "Bullish Harami", Two, Bullish,
        "A bullish reversal pattern where a small bullish candle is contained within the previous bearish candle.";
    BearishHarami => "Bearish Harami", Two, Bearish,
        "A bearish reversal pattern where a small bearish candle is contained within the previous bullish candle.";
    HaramiCross => "Harami Cross", Two, Neutral,
        "A harami pattern where the second candle is a doji.";
    PiercingPattern => "Piercing Pattern", Two, Bullish,
        "A bullish reversal pattern where the current candle opens below the previous low but closes above the midpoint.";
    DarkCloudCover => "Dark Cloud Cover", Two, Bearish,
        "A bearish reversal pattern where the current candle opens above the previous high but closes below the midpoint.";
    TweezerTops => "Tweezer Tops", Two, Bearish,
        "Two candles with identical highs, indicating resistance.";
    TweezerBottoms => "Tweezer Bottoms", Two, Bullish,
        "Two candles with identical lows, indicating support.";

    // Three candle
    MorningStar => "Morning Star", Three, Bullish,
        "A bullish reversal pattern with a bearish candle, a small-bodied candle, and a bullish candle.";
    EveningStar => "Evening Star", Three, Bearish,
        "A bearish reversal pattern with a bullish candle, a small-bodied candle, and a bearish candle.";
    ThreeWhiteSoldiers => "Three White Soldiers", Three, Bullish,
        "Three consecutive bullish candles with higher opens and closes.";
    ThreeBlackCrows => "Three Black Crows", Three, Bearish,
        "Three consecutive bearish candles with lower opens and closes.";
    ThreeInsideUp => "Three Inside Up", Three, Bullish,
        "A bullish reversal pattern with a bearish candle, a harami, and a bullish candle.";
    ThreeInsideDown => "Three Inside Down", Three, Bearish,
        "A bearish reversal pattern with a bullish candle, a harami, and a bearish candle.";
    ThreeOutsideUp => "Three Outside Up", Three, Bullish,
        "A bullish reversal pattern with a bearish candle, an engulfing, and a bullish candle.";
    ThreeOutsideDown => "Three Outside Down", Three, Bearish,
        "A bearish reversal pattern with a bullish candle, an engulfing, and a bearish candle.";
}

impl PatternLabel {
    /// Returns true if this pattern typically signals bullish moves
    pub fn is_typically_bullish(self) -> bool {
        self.typical_direction().is_bullish()
    }

    /// Returns true if this pattern typically signals bearish moves
    pub fn is_typically_bearish(self) -> bool {
        self.typical_direction().is_bearish()
    }

    /// Member of the mutually exclusive single-candle Doji family
    pub fn is_doji_family(self) -> bool {
        matches!(
            self,
            PatternLabel::Doji
                | PatternLabel::DragonflyDoji
                | PatternLabel::GravestoneDoji
                | PatternLabel::LongLeggedDoji
        )
    }
}

impl fmt::Display for PatternLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fallback text for names outside the vocabulary.
pub const UNKNOWN_DESCRIPTION: &str = "Pattern description not available.";

/// Description for a pattern name, or [`UNKNOWN_DESCRIPTION`].
pub fn pattern_description(name: &str) -> &'static str {
    name.parse::<PatternLabel>()
        .map(PatternLabel::description)
        .unwrap_or(UNKNOWN_DESCRIPTION)
}
