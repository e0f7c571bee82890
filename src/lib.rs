//! # candlelabel
//!
//! Rule-based candlestick pattern labelling for OHLC series.
//!
//! Raw candles are turned into per-candle geometric features with rolling
//! baselines, a fixed table of single-, two- and three-candle predicates is
//! evaluated against the tail of the series, and the matching pattern names
//! are returned in a deterministic order.
//!
//! ## Quick Start
//!
//! ```rust
//! use candlelabel::prelude::*;
//!
//! let bars = vec![
//!     Candle::new(120.0, 128.0, 94.0, 115.0),
//!     Candle::new(95.0, 125.0, 94.0, 124.0),
//! ];
//!
//! let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
//! let labels = engine.detect(&bars).unwrap();
//! assert!(labels.contains(&PatternLabel::BullishEngulfing));
//! ```

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::predicates::{single_candle_rules, three_candle_rules, two_candle_rules, Rule};

pub mod label;
pub mod predicates;
pub mod records;

pub use label::{pattern_description, Arity, Direction, PatternLabel};

pub mod prelude {
    pub use crate::{
        // Labels
        label::{pattern_description, Arity, Direction, PatternLabel},
        // Rules
        predicates::{
            single_candle_rules, three_candle_rules, two_candle_rules, Predicate, Rule,
        },
        // Records
        records::{candles_from_columns, candles_from_json, detect_patterns_json},
        // Parallel
        scan_parallel,
        // Iterator
        BarPatterns,
        // Types
        Candle,
        CandleFeatures,
        // Convenience
        detect_patterns,
        DefaultEngine,
        EngineBuilder,
        EngineConfig,
        FeatureDeriver,
        OHLCVExt,
        PatternEngine,
        // Errors
        PatternError,
        PatternIterator,
        Period,
        Result,
        RollingFeatureDeriver,
        RollingMean,
        ScanError,
        ScanResult,
        SchemaError,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors that can occur during pattern labelling
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Unknown pattern: {0}")]
    UnknownPattern(String),
}

/// Input records do not have the shape the deriver needs.
///
/// Fatal for the evaluation it occurs in; nothing is labelled.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("record {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("column `{column}` has {got} rows, expected {expected}")]
    ColumnLength {
        column: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("malformed input: {0}")]
    Malformed(String),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(PatternError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

/// Trailing window used for the body and range baselines.
pub const DEFAULT_WINDOW: Period = Period::new_const(20);

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLC data trait. Volume is optional.
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;

    fn volume(&self) -> Option<f64> {
        None
    }
}

/// Extension trait with computed geometry for OHLC data
pub trait OHLCVExt: OHLCV {
    /// Signed body: close - open
    #[inline]
    fn body(&self) -> f64 {
        self.close() - self.open()
    }

    #[inline]
    fn body_size(&self) -> f64 {
        self.body().abs()
    }

    #[inline]
    fn total_size(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_shadow(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_shadow(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.body() > 0.0
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.body() < 0.0
    }

    /// Validate OHLC data consistency
    fn validate(&self) -> Result<()> {
        let values = [self.open(), self.high(), self.low(), self.close()];
        if values.iter().any(|v| v.is_nan()) {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if values.iter().any(|v| v.is_infinite()) {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if self.high() < self.low() {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "high < low",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV + ?Sized> OHLCVExt for T {}

/// A single OHLC observation
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Candle {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }
}

impl OHLCV for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> Option<f64> {
        self.volume
    }
}

// ============================================================
// CANDLE FEATURES
// ============================================================

/// Derived geometry of one candle plus its trailing baselines
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CandleFeatures {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// close - open (signed)
    pub body: f64,
    pub body_size: f64,
    pub upper_shadow: f64,
    pub lower_shadow: f64,
    /// high - low
    pub total_size: f64,
    pub is_bullish: bool,
    pub is_bearish: bool,
    /// Mean body size over the trailing window, current candle included
    pub avg_body_size: f64,
    /// Mean total size over the trailing window, current candle included
    pub avg_total_size: f64,
}

impl CandleFeatures {
    pub fn from_bar<T: OHLCV + ?Sized>(bar: &T, avg_body_size: f64, avg_total_size: f64) -> Self {
        Self {
            open: bar.open(),
            high: bar.high(),
            low: bar.low(),
            close: bar.close(),
            body: bar.body(),
            body_size: bar.body_size(),
            upper_shadow: bar.upper_shadow(),
            lower_shadow: bar.lower_shadow(),
            total_size: bar.total_size(),
            is_bullish: bar.is_bullish(),
            is_bearish: bar.is_bearish(),
            avg_body_size,
            avg_total_size,
        }
    }
}

/// Simple moving average over a bounded ring buffer.
///
/// The mean is summed from the buffer on every push, so it depends only on
/// the samples currently in the window and never on evicted history. Memory
/// and per-step cost are bounded by the window, not the series.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    samples: VecDeque<f64>,
}

impl RollingMean {
    pub fn new(window: Period) -> Self {
        Self {
            window: window.get(),
            samples: VecDeque::with_capacity(window.get()),
        }
    }

    /// Add a sample and return the mean of the samples now in the window.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(value);

        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Turns candles into [`CandleFeatures`], one per candle, aligned by index
pub trait FeatureDeriver: Send + Sync {
    fn derive_all<T: OHLCV>(&self, bars: &[T]) -> Vec<CandleFeatures>;

    /// Features for the last `count` candles only.
    fn derive_tail<T: OHLCV>(&self, bars: &[T], count: usize) -> Vec<CandleFeatures> {
        let mut all = self.derive_all(bars);
        let skip = all.len().saturating_sub(count);
        all.split_off(skip)
    }
}

/// Default deriver: trailing simple moving averages of body and total size
#[derive(Debug, Clone)]
pub struct RollingFeatureDeriver {
    pub window: Period,
}

impl Default for RollingFeatureDeriver {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }
}

impl RollingFeatureDeriver {
    pub fn new(window: Period) -> Self {
        Self { window }
    }
}

impl FeatureDeriver for RollingFeatureDeriver {
    fn derive_all<T: OHLCV>(&self, bars: &[T]) -> Vec<CandleFeatures> {
        let mut avg_body = RollingMean::new(self.window);
        let mut avg_total = RollingMean::new(self.window);

        bars.iter()
            .map(|bar| {
                let body_mean = avg_body.push(bar.body_size());
                let total_mean = avg_total.push(bar.total_size());
                CandleFeatures::from_bar(bar, body_mean, total_mean)
            })
            .collect()
    }

    /// Replays only the candles whose window reaches the last `count`.
    fn derive_tail<T: OHLCV>(&self, bars: &[T], count: usize) -> Vec<CandleFeatures> {
        let lookback = count.saturating_add(self.window.get() - 1);
        let start = bars.len().saturating_sub(lookback);
        let mut features = self.derive_all(&bars[start..]);
        let skip = features.len().saturating_sub(count);
        features.split_off(skip)
    }
}

// ============================================================
// CONFIG
// ============================================================

/// Engine configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Baseline window for [`RollingFeatureDeriver`]
    pub window: Period,
    /// Reject NaN, infinite and `high < low` candles before evaluation
    pub validate_data: bool,
    /// Emit only these labels
    pub pattern_filter: Option<Vec<PatternLabel>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            validate_data: false,
            pattern_filter: None,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PatternError::InvalidConfig(e.to_string()))
    }
}

// ============================================================
// PATTERN ENGINE
// ============================================================

/// Main pattern labelling engine
///
/// Holds no mutable state; share it freely across threads.
#[derive(Debug, Clone)]
pub struct PatternEngine<D: FeatureDeriver = RollingFeatureDeriver> {
    /// Rules grouped by arity, each group in insertion order
    tiers: [Vec<Rule>; 3],
    deriver: D,
    config: EngineConfig,
}

impl Default for PatternEngine<RollingFeatureDeriver> {
    fn default() -> Self {
        Self {
            tiers: [
                single_candle_rules().to_vec(),
                two_candle_rules().to_vec(),
                three_candle_rules().to_vec(),
            ],
            deriver: RollingFeatureDeriver::default(),
            config: EngineConfig::default(),
        }
    }
}

impl<D: FeatureDeriver> PatternEngine<D> {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// All rules in evaluation order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.tiers.iter().flatten()
    }

    // ===========================================
    // LOW-LEVEL: Primitives
    // ===========================================

    /// Derive features for every candle.
    #[inline]
    pub fn derive_features<T: OHLCV>(&self, bars: &[T]) -> Vec<CandleFeatures> {
        self.deriver.derive_all(bars)
    }

    /// Labels for the tail ending at `index` of already-derived features.
    pub fn detect_at(&self, features: &[CandleFeatures], index: usize) -> Vec<PatternLabel> {
        if index >= features.len() {
            return Vec::new();
        }
        let start = index.saturating_sub(Arity::Three.candles() - 1);
        self.evaluate_tail(&features[start..=index])
    }

    // ===========================================
    // HIGH-LEVEL
    // ===========================================

    /// Labels for the most recent candle of `bars`.
    ///
    /// An empty series yields an empty list. Shorter series simply skip the
    /// tiers they cannot fill.
    pub fn detect<T: OHLCV>(&self, bars: &[T]) -> Result<Vec<PatternLabel>> {
        if self.config.validate_data {
            validate_bars(bars)?;
        }
        Ok(self.detect_unchecked(bars))
    }

    /// Labels for every index, each evaluated as if it were the tail.
    pub fn scan_grouped<T: OHLCV>(&self, bars: &[T]) -> Result<Vec<Vec<PatternLabel>>> {
        if self.config.validate_data {
            validate_bars(bars)?;
        }

        let features = self.derive_features(bars);
        Ok((0..features.len())
            .map(|i| self.detect_at(&features, i))
            .collect())
    }

    /// Iterate over bars with their labels.
    pub fn iter<'a, T: OHLCV>(&'a self, bars: &'a [T]) -> PatternIterator<'a, D> {
        PatternIterator::new(self, self.derive_features(bars))
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn detect_unchecked<T: OHLCV>(&self, bars: &[T]) -> Vec<PatternLabel> {
        if bars.is_empty() {
            return Vec::new();
        }

        let tail = self.deriver.derive_tail(bars, Arity::Three.candles());
        let labels = self.evaluate_tail(&tail);
        debug!(candles = bars.len(), labels = labels.len(), "evaluated series tail");
        labels
    }

    /// Runs every tier the tail is long enough for, single-candle first.
    fn evaluate_tail(&self, tail: &[CandleFeatures]) -> Vec<PatternLabel> {
        let mut labels = Vec::new();

        for (arity, rules) in Arity::ALL.iter().zip(&self.tiers) {
            if tail.len() < arity.candles() {
                break;
            }
            labels.extend(
                rules
                    .iter()
                    .filter_map(|rule| rule.evaluate(tail))
                    .filter(|label| self.should_include(*label)),
            );
        }

        labels
    }

    fn should_include(&self, label: PatternLabel) -> bool {
        match self.config.pattern_filter {
            Some(ref filter) => filter.contains(&label),
            None => true,
        }
    }

    fn validate(&self) -> Result<()> {
        let mut seen = Vec::new();
        for rule in self.rules() {
            if seen.contains(&rule.label) {
                return Err(PatternError::InvalidConfig(format!(
                    "duplicate rule for {}",
                    rule.label
                )));
            }
            seen.push(rule.label);
        }
        Ok(())
    }
}

fn validate_bars<T: OHLCV>(bars: &[T]) -> Result<()> {
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            PatternError::InvalidOHLCV { reason, .. } => {
                PatternError::InvalidOHLCV { index: i, reason }
            }
            other => other,
        })?;
    }
    Ok(())
}

// ============================================================
// PATTERN ITERATOR
// ============================================================

/// Labels found at a specific bar
#[derive(Debug, Clone, PartialEq)]
pub struct BarPatterns {
    pub index: usize,
    pub labels: Vec<PatternLabel>,
}

/// Iterator over bars with their labels
pub struct PatternIterator<'a, D: FeatureDeriver> {
    engine: &'a PatternEngine<D>,
    features: Vec<CandleFeatures>,
    current: usize,
}

impl<'a, D: FeatureDeriver> PatternIterator<'a, D> {
    fn new(engine: &'a PatternEngine<D>, features: Vec<CandleFeatures>) -> Self {
        Self {
            engine,
            features,
            current: 0,
        }
    }
}

impl<'a, D: FeatureDeriver> Iterator for PatternIterator<'a, D> {
    type Item = BarPatterns;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.features.len() {
            return None;
        }

        let index = self.current;
        let labels = self.engine.detect_at(&self.features, index);
        self.current += 1;

        Some(BarPatterns { index, labels })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.features.len().saturating_sub(self.current);
        (remaining, Some(remaining))
    }
}

impl<'a, D: FeatureDeriver> ExactSizeIterator for PatternIterator<'a, D> {}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating PatternEngine instances
pub struct EngineBuilder<D: FeatureDeriver = RollingFeatureDeriver> {
    deriver: D,
    rules: Vec<Rule>,
    config: EngineConfig,
}

impl Default for EngineBuilder<RollingFeatureDeriver> {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder<RollingFeatureDeriver> {
    pub fn new() -> Self {
        Self::from_config(EngineConfig::default())
    }

    /// Start from a loaded config. No rules are added.
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            deriver: RollingFeatureDeriver::new(config.window),
            rules: Vec::new(),
            config,
        }
    }

    /// Change the baseline window
    pub fn window(mut self, window: Period) -> Self {
        self.deriver = RollingFeatureDeriver::new(window);
        self.config.window = window;
        self
    }
}

impl<D: FeatureDeriver> EngineBuilder<D> {
    /// Change feature deriver
    pub fn feature_deriver<D2: FeatureDeriver>(self, deriver: D2) -> EngineBuilder<D2> {
        EngineBuilder {
            deriver,
            rules: self.rules,
            config: self.config,
        }
    }

    /// Add all builtin rules
    pub fn with_all_defaults(self) -> Self {
        self.with_single_candle_defaults()
            .with_two_candle_defaults()
            .with_three_candle_defaults()
    }

    /// Add single-candle rules (Doji family counts as one rule)
    pub fn with_single_candle_defaults(mut self) -> Self {
        self.rules.extend(single_candle_rules());
        self
    }

    /// Add two-candle rules
    pub fn with_two_candle_defaults(mut self) -> Self {
        self.rules.extend(two_candle_rules());
        self
    }

    /// Add three-candle rules
    pub fn with_three_candle_defaults(mut self) -> Self {
        self.rules.extend(three_candle_rules());
        self
    }

    /// Add a rule
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Filter to specific patterns only
    pub fn only_patterns(mut self, labels: impl IntoIterator<Item = PatternLabel>) -> Self {
        self.config.pattern_filter = Some(labels.into_iter().collect());
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<PatternEngine<D>> {
        let mut tiers: [Vec<Rule>; 3] = Default::default();
        for rule in self.rules {
            let slot = match rule.arity() {
                Arity::Single => 0,
                Arity::Two => 1,
                Arity::Three => 2,
            };
            tiers[slot].push(rule);
        }

        let engine = PatternEngine {
            tiers,
            deriver: self.deriver,
            config: self.config,
        };
        engine.validate()?;
        Ok(engine)
    }
}

// ============================================================
// CONVENIENCE
// ============================================================

/// Default engine with RollingFeatureDeriver
pub type DefaultEngine = PatternEngine<RollingFeatureDeriver>;

/// Labels for the most recent candle using every builtin rule.
pub fn detect_patterns<T: OHLCV>(bars: &[T]) -> Vec<PatternLabel> {
    DefaultEngine::default().detect_unchecked(bars)
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of labelling a single instrument
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub labels: Vec<PatternLabel>,
}

/// Error from labelling a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: PatternError,
}

/// Label the tail of many instruments in parallel.
///
/// Each series is evaluated independently; a failure is reported for its
/// symbol only. Output order carries no meaning.
pub fn scan_parallel<'a, T, I, D>(
    engine: &PatternEngine<D>,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
    D: FeatureDeriver,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            engine
                .detect(bars)
                .map(|labels| ScanResult {
                    symbol: symbol.to_string(),
                    labels,
                })
                .map_err(|error| {
                    warn!(symbol, %error, "instrument scan failed");
                    ScanError {
                        symbol: symbol.to_string(),
                        error,
                    }
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Ten reference bars; the last one is rewritten per test.
    fn reference_bars() -> Vec<Candle> {
        let open = [100.0, 105.0, 110.0, 108.0, 112.0, 115.0, 113.0, 118.0, 120.0, 122.0];
        let high = [107.0, 112.0, 115.0, 113.0, 118.0, 120.0, 117.0, 125.0, 128.0, 130.0];
        let low = [98.0, 103.0, 108.0, 105.0, 110.0, 112.0, 110.0, 115.0, 118.0, 120.0];
        let close = [105.0, 110.0, 108.0, 112.0, 115.0, 113.0, 118.0, 120.0, 122.0, 125.0];
        (0..10)
            .map(|i| Candle::new(open[i], high[i], low[i], close[i]))
            .collect()
    }

    fn naive_mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    #[test]
    fn test_period_validation() {
        assert!(Period::new(1).is_ok());
        assert!(Period::new(20).is_ok());
        assert!(Period::new(0).is_err());
    }

    #[test]
    fn test_ohlcv_ext() {
        let bar = Candle::new(100.0, 110.0, 90.0, 105.0);
        assert_eq!(bar.body(), 5.0);
        assert_eq!(bar.body_size(), 5.0);
        assert_eq!(bar.total_size(), 20.0);
        assert_eq!(bar.upper_shadow(), 5.0);
        assert_eq!(bar.lower_shadow(), 10.0);
        assert!(bar.is_bullish());
        assert!(!bar.is_bearish());

        let bear = Candle::new(105.0, 110.0, 90.0, 100.0);
        assert_eq!(bear.body(), -5.0);
        assert!(bear.is_bearish());
    }

    #[test]
    fn test_zero_body_is_neither_direction() {
        let bar = Candle::new(100.0, 101.0, 99.0, 100.0);
        assert!(!bar.is_bullish());
        assert!(!bar.is_bearish());
    }

    #[test]
    fn test_validate_bar() {
        assert!(Candle::new(1.0, 2.0, 0.5, 1.5).validate().is_ok());
        assert!(Candle::new(1.0, 0.5, 2.0, 1.5).validate().is_err());
        assert!(Candle::new(f64::NAN, 2.0, 0.5, 1.5).validate().is_err());
        assert!(Candle::new(1.0, f64::INFINITY, 0.5, 1.5).validate().is_err());
    }

    #[test]
    fn test_rolling_mean_warm_up_and_eviction() {
        let mut mean = RollingMean::new(Period::new(3).unwrap());
        assert_eq!(mean.push(3.0), 3.0);
        assert_eq!(mean.push(5.0), 4.0);
        assert_eq!(mean.push(7.0), 5.0);
        assert_eq!(mean.push(9.0), 7.0);
        assert_eq!(mean.len(), 3);
    }

    #[test]
    fn test_rolling_mean_recovers_after_nan() {
        let mut mean = RollingMean::new(Period::new(2).unwrap());
        mean.push(1.0);
        assert!(mean.push(f64::NAN).is_nan());
        assert!(mean.push(3.0).is_nan());
        assert_eq!(mean.push(5.0), 4.0);
    }

    #[test]
    fn test_features_match_naive_window() {
        let bars: Vec<Candle> = (0..45)
            .map(|i| {
                let base = 100.0 + ((i * 7) % 11) as f64;
                let close = base + ((i * 3) % 5) as f64 - 2.0;
                Candle::new(base, base.max(close) + 1.5, base.min(close) - 0.5, close)
            })
            .collect();

        let features = RollingFeatureDeriver::default().derive_all(&bars);
        assert_eq!(features.len(), bars.len());

        for (i, f) in features.iter().enumerate() {
            let start = (i + 1).saturating_sub(20);
            let bodies: Vec<f64> = bars[start..=i].iter().map(|b| b.body_size()).collect();
            let totals: Vec<f64> = bars[start..=i].iter().map(|b| b.total_size()).collect();
            assert_eq!(f.avg_body_size, naive_mean(&bodies));
            assert_eq!(f.avg_total_size, naive_mean(&totals));
        }
    }

    #[test]
    fn test_derive_tail_matches_derive_all() {
        let bars = reference_bars()
            .into_iter()
            .cycle()
            .take(37)
            .collect::<Vec<_>>();
        let deriver = RollingFeatureDeriver::default();
        let all = deriver.derive_all(&bars);

        for count in [1, 3, 5, 37, 50] {
            let tail = deriver.derive_tail(&bars, count);
            let expect = &all[all.len().saturating_sub(count)..];
            assert_eq!(tail.as_slice(), expect);
        }
    }

    /// Large bodies followed by a small-body regime
    fn regime_change_bars() -> Vec<Candle> {
        let large = (0..40).map(|i| {
            let open = 1.0e7 + (i as f64) * 1234.567;
            let close = open + 1.0e7 + ((i * 37) % 101) as f64 * 9876.54321;
            Candle::new(open, close + 0.5e7, open - 0.3e7, close)
        });
        let small = (0..25).map(|_| Candle::new(100.0, 100.75, 99.5, 100.25));
        large.chain(small).collect()
    }

    #[test]
    fn test_baseline_forgets_evicted_history() {
        let bars = regime_change_bars();
        let deriver = RollingFeatureDeriver::default();
        let all = deriver.derive_all(&bars);

        // the last window holds only the small candles
        let last = all[all.len() - 1];
        assert_eq!(last.avg_body_size, 0.25);
        assert_eq!(last.avg_total_size, 1.25);

        for count in [1, 3, 20, 64, 65] {
            let tail = deriver.derive_tail(&bars, count);
            assert_eq!(tail.as_slice(), &all[all.len() - count..]);
        }
    }

    #[test]
    fn test_scan_grouped_agrees_with_detect_after_regime_change() {
        let engine = DefaultEngine::default();
        let bars = regime_change_bars();
        let grouped = engine.scan_grouped(&bars).unwrap();

        // body == baseline, so Spinning Top must not fire on either path
        assert!(grouped[bars.len() - 1].is_empty());
        for i in 0..bars.len() {
            assert_eq!(grouped[i], engine.detect(&bars[..=i]).unwrap(), "index {i}");
        }
    }

    #[test]
    fn test_derive_tail_huge_count() {
        let bars = reference_bars();
        let deriver = RollingFeatureDeriver::default();
        assert_eq!(
            deriver.derive_tail(&bars, usize::MAX),
            deriver.derive_all(&bars)
        );
    }

    #[test]
    fn test_engine_builder() {
        let engine = EngineBuilder::new().with_all_defaults().build();
        assert!(engine.is_ok());
        assert_eq!(engine.unwrap().rules().count(), 25);
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let engine = EngineBuilder::new()
            .with_single_candle_defaults()
            .with_single_candle_defaults()
            .build();
        assert!(matches!(engine, Err(PatternError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_detect() {
        let engine = DefaultEngine::default();
        let bars: Vec<Candle> = vec![];
        assert!(engine.detect(&bars).unwrap().is_empty());
        assert!(engine.scan_grouped(&bars).unwrap().is_empty());
    }

    #[test]
    fn test_hammer_after_reference_window() {
        let mut bars = reference_bars();
        bars[9] = Candle::new(100.0, 102.0, 90.0, 101.0);
        let labels = detect_patterns(&bars);
        assert!(labels.contains(&PatternLabel::Hammer), "{labels:?}");
    }

    #[test]
    fn test_three_white_soldiers_reference() {
        let labels = detect_patterns(&reference_bars());
        assert!(labels.contains(&PatternLabel::ThreeWhiteSoldiers), "{labels:?}");
    }

    #[test]
    fn test_rules_added_out_of_order_are_grouped() {
        let engine = EngineBuilder::new()
            .with_three_candle_defaults()
            .with_single_candle_defaults()
            .build()
            .unwrap();
        let arities: Vec<Arity> = engine.rules().map(|r| r.arity()).collect();
        let mut sorted = arities.clone();
        sorted.sort();
        assert_eq!(arities, sorted);
    }

    #[test]
    fn test_pattern_filter() {
        let engine = EngineBuilder::new()
            .with_all_defaults()
            .only_patterns([PatternLabel::BullishMarubozu])
            .build()
            .unwrap();

        let mut bars = reference_bars();
        bars[9] = Candle::new(100.0, 102.0, 90.0, 101.0); // Hammer
        assert!(engine.detect(&bars).unwrap().is_empty());
    }

    #[test]
    fn test_validate_data_reports_index() {
        let engine = EngineBuilder::new()
            .with_all_defaults()
            .validate_data(true)
            .build()
            .unwrap();

        let mut bars = reference_bars();
        bars[4] = Candle::new(1.0, 0.5, 2.0, 1.5);
        let err = engine.detect(&bars).unwrap_err();
        assert_eq!(
            err,
            PatternError::InvalidOHLCV {
                index: 4,
                reason: "high < low"
            }
        );
    }

    #[test]
    fn test_unvalidated_inconsistent_candle_is_evaluated() {
        let engine = DefaultEngine::default();
        let bars = vec![Candle::new(1.0, 0.5, 2.0, 1.5)];
        assert!(engine.detect(&bars).is_ok());
    }

    #[test]
    fn test_scan_grouped_matches_detect_on_prefix() {
        let engine = DefaultEngine::default();
        let bars = reference_bars();
        let grouped = engine.scan_grouped(&bars).unwrap();
        assert_eq!(grouped.len(), bars.len());
        for i in 0..bars.len() {
            assert_eq!(grouped[i], engine.detect(&bars[..=i]).unwrap());
        }
    }

    #[test]
    fn test_iterator_exact_size() {
        let engine = DefaultEngine::default();
        let bars = reference_bars();
        let iter = engine.iter(&bars);
        assert_eq!(iter.len(), 10);
        let last = iter.last().unwrap();
        assert_eq!(last.index, 9);
        assert_eq!(last.labels, engine.detect(&bars).unwrap());
    }

    #[test]
    fn test_detect_at_out_of_range() {
        let engine = DefaultEngine::default();
        let features = engine.derive_features(&reference_bars());
        assert!(engine.detect_at(&features, 10).is_empty());
    }

    #[test]
    fn test_config_from_json() {
        let config = EngineConfig::from_json(
            r#"{"window": 10, "pattern_filter": ["Hammer", "Doji"]}"#,
        )
        .unwrap();
        assert_eq!(config.window.get(), 10);
        assert!(!config.validate_data);
        assert_eq!(
            config.pattern_filter,
            Some(vec![PatternLabel::Hammer, PatternLabel::Doji])
        );

        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
        assert!(EngineConfig::from_json(r#"{"window": 0}"#).is_err());
        assert!(EngineConfig::from_json(r#"{"pattern_filter": ["Nope"]}"#).is_err());
    }

    #[test]
    fn test_builder_from_config_window() {
        let config = EngineConfig {
            window: Period::new(2).unwrap(),
            ..EngineConfig::default()
        };
        let engine = EngineBuilder::from_config(config)
            .with_all_defaults()
            .build()
            .unwrap();

        let bars = vec![
            Candle::new(100.0, 110.0, 90.0, 110.0),
            Candle::new(100.0, 101.0, 99.0, 101.0),
            Candle::new(100.0, 101.0, 99.0, 101.0),
        ];
        let features = engine.derive_features(&bars);
        assert_eq!(features[2].avg_body_size, 1.0);
    }

    #[test]
    fn test_parallel_scan_isolates_failures() {
        let engine = EngineBuilder::new()
            .with_all_defaults()
            .validate_data(true)
            .build()
            .unwrap();

        let good = reference_bars();
        let mut bad = reference_bars();
        bad[0] = Candle::new(f64::NAN, 1.0, 0.0, 1.0);

        let instruments: Vec<(&str, &[Candle])> = vec![
            ("GOOD", good.as_slice()),
            ("BAD", bad.as_slice()),
            ("ALSO_GOOD", good.as_slice()),
        ];

        let (results, errors) = scan_parallel(&engine, instruments);
        assert_eq!(results.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].symbol, "BAD");
        assert!(results
            .iter()
            .all(|r| r.labels.contains(&PatternLabel::ThreeWhiteSoldiers)));
    }
}
