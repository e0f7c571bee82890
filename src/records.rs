//! Schema-checked ingestion of untyped OHLC records
//!
//! Two shapes are accepted: a JSON array of row objects, and a table of named
//! columns. Header names are matched case-insensitively after trimming, so
//! `"Open"`, `" open "` and `"OPEN"` all feed the `open` field. Any shape
//! problem is reported as a [`SchemaError`] and nothing is labelled.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::{detect_patterns, Candle, PatternLabel, Result, SchemaError};

const REQUIRED: [&str; 4] = ["open", "high", "low", "close"];
const VOLUME: &str = "volume";

// ============================================================
// ROW RECORDS
// ============================================================

/// Parse a JSON array of `{open, high, low, close[, volume]}` objects.
///
/// Extra keys are ignored. A missing or `null` price field fails with
/// [`SchemaError::MissingField`].
pub fn candles_from_json(json: &str) -> Result<Vec<Candle>> {
    let value: Value = serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;

    let rows = match value {
        Value::Array(rows) => rows,
        other => {
            return Err(malformed(format!(
                "expected an array of records, found {}",
                kind(&other)
            ))
            .into())
        }
    };

    rows.iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Object(fields) => candle_from_row(index, fields),
            other => Err(malformed(format!(
                "record {index} is {}, expected an object",
                kind(other)
            ))
            .into()),
        })
        .collect()
}

fn candle_from_row(index: usize, fields: &Map<String, Value>) -> Result<Candle> {
    let mut prices = [0.0; 4];
    for (slot, field) in prices.iter_mut().zip(REQUIRED) {
        *slot = match find(fields.iter(), field) {
            None | Some(Value::Null) => {
                warn!(index, field, "record is missing a required field");
                return Err(SchemaError::MissingField { index, field }.into());
            }
            Some(value) => number(index, field, value)?,
        };
    }

    let volume = match find(fields.iter(), VOLUME) {
        None | Some(Value::Null) => None,
        Some(value) => Some(number(index, VOLUME, value)?),
    };

    let [open, high, low, close] = prices;
    let candle = Candle::new(open, high, low, close);
    Ok(match volume {
        Some(volume) => candle.with_volume(volume),
        None => candle,
    })
}

fn number(index: usize, field: &'static str, value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| {
        malformed(format!(
            "record {index} field `{field}` is {}, expected a number",
            kind(value)
        ))
        .into()
    })
}

// ============================================================
// COLUMN TABLES
// ============================================================

/// Build candles from a table of named columns.
///
/// A table with no columns at all is an empty series. Otherwise every price
/// column must be present and all used columns must share one length.
pub fn candles_from_columns(columns: &HashMap<String, Vec<f64>>) -> Result<Vec<Candle>> {
    if columns.is_empty() {
        return Ok(Vec::new());
    }

    let mut found = Vec::with_capacity(REQUIRED.len());
    for name in REQUIRED {
        match find(columns.iter(), name) {
            Some(values) => found.push((name, values)),
            None => {
                warn!(column = name, "table is missing a required column");
                return Err(SchemaError::MissingColumn(name).into());
            }
        }
    }
    let volume = find(columns.iter(), VOLUME);

    let expected = found[0].1.len();
    let lengths = found
        .iter()
        .copied()
        .chain(volume.map(|values| (VOLUME, values)));
    for (name, values) in lengths {
        if values.len() != expected {
            warn!(column = name, expected, got = values.len(), "ragged column table");
            return Err(SchemaError::ColumnLength {
                column: name,
                expected,
                got: values.len(),
            }
            .into());
        }
    }

    let (open, high, low, close) = (found[0].1, found[1].1, found[2].1, found[3].1);
    Ok((0..expected)
        .map(|i| Candle {
            open: open[i],
            high: high[i],
            low: low[i],
            close: close[i],
            volume: volume.map(|v| v[i]),
        })
        .collect())
}

// ============================================================
// CONVENIENCE
// ============================================================

/// Ingest JSON records and label the most recent candle.
pub fn detect_patterns_json(json: &str) -> Result<Vec<PatternLabel>> {
    let candles = candles_from_json(json)?;
    Ok(detect_patterns(&candles))
}

// ============================================================
// Internal helpers
// ============================================================

#[inline]
fn header_matches(header: &str, name: &str) -> bool {
    header.trim().eq_ignore_ascii_case(name)
}

/// Entry whose header matches `name`; the smallest raw header wins ties.
fn find<'a, V>(
    entries: impl Iterator<Item = (&'a String, &'a V)>,
    name: &str,
) -> Option<&'a V> {
    entries
        .filter(|(header, _)| header_matches(header, name))
        .min_by(|a, b| a.0.cmp(b.0))
        .map(|(_, value)| value)
}

fn malformed(message: String) -> SchemaError {
    warn!(%message, "malformed input records");
    SchemaError::Malformed(message)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
