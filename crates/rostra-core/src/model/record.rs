//! Speech records and their canonical typed view.
//!
//! Backends hand records back as loosely-typed JSON objects whose field
//! names and value types drift between real and synthetic sources. A
//! [`Record`] keeps that raw shape; [`CanonicalRecord`] reads the canonical
//! fields out of a normalized record, tolerating the common encodings
//! (booleans stored as `0`/`1`, stances stored as strings, and so on).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single row as returned by a backend: field name to JSON value.
pub type Record = serde_json::Map<String, Value>;

pub const COUNTRY: &str = "country";
pub const AUTHOR: &str = "author";
pub const IS_GOV: &str = "is_gov";
pub const DATE: &str = "date";
pub const TITLE: &str = "title";
pub const TEXT: &str = "text";
pub const TARIFF_MENTION: &str = "tariff_mention";
pub const MONETARY_STANCE: &str = "monetary_stance";
pub const TRADE_STANCE: &str = "trade_stance";
pub const ECONOMIC_OUTLOOK: &str = "economic_outlook";

/// The unified speech schema.
///
/// Every field is optional because neither backend guarantees any of
/// them. Build one with [`CanonicalRecord::from_record`] after the record
/// has been normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub country: Option<String>,
    pub author: Option<String>,
    pub is_gov: Option<bool>,
    pub date: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub tariff_mention: Option<bool>,
    pub monetary_stance: Option<f64>,
    pub trade_stance: Option<f64>,
    pub economic_outlook: Option<f64>,
}

impl CanonicalRecord {
    /// Read the canonical fields out of a (normalized) record.
    ///
    /// Legacy field names are not consulted here; run
    /// [`normalize_row`](crate::normalize::normalize_row) first.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        Self {
            country: text_field(record, COUNTRY),
            author: text_field(record, AUTHOR),
            is_gov: flag_field(record, IS_GOV),
            date: text_field(record, DATE),
            title: text_field(record, TITLE),
            text: text_field(record, TEXT),
            tariff_mention: flag_field(record, TARIFF_MENTION),
            monetary_stance: number_field(record, MONETARY_STANCE),
            trade_stance: number_field(record, TRADE_STANCE),
            economic_outlook: number_field(record, ECONOMIC_OUTLOOK),
        }
    }
}

/// Render a scalar value as text. Nulls, arrays, and objects yield `None`.
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Interpret a value as a flag: `true`/`false`, non-zero numbers, or the
/// strings "true"/"false"/"1"/"0"/"yes"/"no".
pub fn value_as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Interpret a value as a number, accepting numeric strings.
pub fn value_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_field(record: &Record, name: &str) -> Option<String> {
    record.get(name).and_then(value_as_text)
}

fn flag_field(record: &Record, name: &str) -> Option<bool> {
    record.get(name).and_then(value_as_flag)
}

fn number_field(record: &Record, name: &str) -> Option<f64> {
    record.get(name).and_then(value_as_number)
}
