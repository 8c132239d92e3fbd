//! Declared value types and the type-directed coercion applied to raw JSON
//! scalars during decoding.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S";
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Declared type of a rule's value; governs coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    String,
    Integer,
    Double,
    Boolean,
    Date,
    Time,
    DateTime,
    /// Unrecognized declared type: values pass through unconverted, with no
    /// coercion guarantee.
    Other(String),
}

impl ValueType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "string" => ValueType::String,
            "integer" => ValueType::Integer,
            "double" => ValueType::Double,
            "boolean" => ValueType::Boolean,
            "date" => ValueType::Date,
            "time" => ValueType::Time,
            "datetime" => ValueType::DateTime,
            other => ValueType::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Double => "double",
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
            ValueType::Time => "time",
            ValueType::DateTime => "datetime",
            ValueType::Other(name) => name,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// A coerced scalar. `Raw` carries values of unrecognized declared types
/// through unconverted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Raw(serde_json::Value),
}

impl Value {
    /// Re-render into the wire form the decoder accepts, so round-trips are
    /// lossless. Calendar values emit their canonical format.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Integer(i) => (*i).into(),
            Value::Double(f) => {
                serde_json::Number::from_f64(*f).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null)
            }
            Value::Boolean(b) => (*b).into(),
            Value::Date(d) => d.format(DATE_FORMAT).to_string().into(),
            Value::Time(t) => t.format(TIME_FORMAT).to_string().into(),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string().into(),
            Value::Raw(raw) => raw.clone(),
        }
    }
}

/// Convert a raw JSON scalar into the in-memory value for `ty`.
///
/// A raw JSON null, or any string equal to `"null"` case-insensitively,
/// coerces to `Value::Null` whatever the declared type; null is never
/// type-coerced so that is-empty style operators keep their sentinel.
pub fn coerce(ty: &ValueType, raw: &serde_json::Value) -> Result<Value, ParseError> {
    if is_null_sentinel(raw) {
        return Ok(Value::Null);
    }
    if let ValueType::Other(_) = ty {
        return Ok(Value::Raw(raw.clone()));
    }
    // arrays are unwrapped by the codec before scalar coercion, so a
    // structural value here never has a coercion target
    if !raw.is_string() && !raw.is_number() && !raw.is_boolean() {
        return Err(coercion_failed(ty, raw));
    }
    match ty {
        ValueType::String => Ok(Value::String(string_cast(raw))),
        ValueType::Integer => integer_cast(raw).map(Value::Integer).ok_or_else(|| coercion_failed(ty, raw)),
        ValueType::Double => double_cast(raw).map(Value::Double).ok_or_else(|| coercion_failed(ty, raw)),
        ValueType::Boolean => Ok(Value::Boolean(truthy(raw))),
        ValueType::Date => {
            let text = text_of(ty, raw)?;
            NaiveDate::parse_from_str(text, DATE_FORMAT).map(Value::Date).map_err(|_| coercion_failed(ty, raw))
        }
        ValueType::Time => {
            let text = text_of(ty, raw)?;
            NaiveTime::parse_from_str(text, TIME_FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
                .map(Value::Time)
                .map_err(|_| coercion_failed(ty, raw))
        }
        ValueType::DateTime => {
            let text = text_of(ty, raw)?;
            NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
                .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
                .map(Value::DateTime)
                .map_err(|_| coercion_failed(ty, raw))
        }
        ValueType::Other(_) => unreachable!("handled above"),
    }
}

fn is_null_sentinel(raw: &serde_json::Value) -> bool {
    match raw {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.eq_ignore_ascii_case("null"),
        _ => false,
    }
}

fn coercion_failed(ty: &ValueType, raw: &serde_json::Value) -> ParseError {
    ParseError::ValueCoercionFailed { ty: ty.clone(), raw: raw.clone() }
}

fn string_cast(raw: &serde_json::Value) -> String {
    match raw {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => if *b { "1".to_string() } else { String::new() },
        _ => raw.to_string(),
    }
}

/// Truncating cast: floats drop their fraction, never round.
fn integer_cast(raw: &serde_json::Value) -> Option<i64> {
    match raw {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        serde_json::Value::String(s) => {
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        serde_json::Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn double_cast(raw: &serde_json::Value) -> Option<f64> {
    match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse::<f64>().ok(),
        serde_json::Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Truthy cast: `false`, `0`, `0.0`, `""` and `"0"` are false, every other
/// scalar is true (including the string `"false"`).
fn truthy(raw: &serde_json::Value) -> bool {
    match raw {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        serde_json::Value::String(s) => !(s.is_empty() || s == "0"),
        _ => true,
    }
}

fn text_of<'a>(ty: &ValueType, raw: &'a serde_json::Value) -> Result<&'a str, ParseError> {
    raw.as_str().ok_or_else(|| coercion_failed(ty, raw))
}
