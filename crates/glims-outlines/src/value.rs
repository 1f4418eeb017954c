//! Attribute cell values.
//!
//! This module provides:
//! - [`Value`] - The dynamic value type stored in attribute columns
//! - [`ValueKind`] - The kind of a value, used for schema inference

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Enum
// ============================================================================

/// A single attribute cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value (i64).
    Integer(i64),
    /// Floating point value (f64).
    Float(f64),
    /// Timestamp normalized to UTC.
    Timestamp(DateTime<Utc>),
    /// Text value.
    Text(String),
}

impl Value {
    /// Check if the value is missing.
    ///
    /// NaN floats count as missing, the same way a numeric column treats them.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Convert to f64 if the value is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) if !v.is_nan() => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Convert to i64 if the value is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrow the text if the value is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Get the timestamp if the value is one.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// The kind of this value, or `None` for missing values.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Null => None,
            Value::Float(v) if v.is_nan() => None,
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Integer(_) => Some(ValueKind::Integer),
            Value::Float(_) => Some(ValueKind::Float),
            Value::Timestamp(_) => Some(ValueKind::Timestamp),
            Value::Text(_) => Some(ValueKind::Text),
        }
    }

    /// Hashable identity of this value for duplicate detection.
    ///
    /// Floats compare by bit pattern, all missing values compare equal.
    pub(crate) fn key(&self) -> ValueKey {
        match self {
            Value::Null => ValueKey::Null,
            Value::Float(v) if v.is_nan() => ValueKey::Null,
            Value::Bool(v) => ValueKey::Bool(*v),
            Value::Integer(v) => ValueKey::Integer(*v),
            Value::Float(v) => ValueKey::Float(v.to_bits()),
            Value::Timestamp(v) => ValueKey::Timestamp(*v),
            Value::Text(v) => ValueKey::Text(v.clone()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Text(v) => write!(f, "{}", v),
        }
    }
}

/// Identity used when comparing rows for exact duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey {
    Null,
    Bool(bool),
    Integer(i64),
    Float(u64),
    Timestamp(DateTime<Utc>),
    Text(String),
}

// ============================================================================
// Value Kind
// ============================================================================

/// The kind of value a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Boolean values.
    Bool,
    /// Integer values.
    Integer,
    /// Floating point values.
    Float,
    /// UTC timestamps.
    Timestamp,
    /// Text values.
    Text,
    /// Values of differing kinds.
    Mixed,
}

impl ValueKind {
    /// Combine two observed kinds into the narrowest kind that covers both.
    ///
    /// Integers widen to floats; any other disagreement is [`ValueKind::Mixed`].
    pub fn merge(self, other: ValueKind) -> ValueKind {
        match (self, other) {
            (a, b) if a == b => a,
            (ValueKind::Integer, ValueKind::Float) | (ValueKind::Float, ValueKind::Integer) => {
                ValueKind::Float
            }
            _ => ValueKind::Mixed,
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Timestamp => write!(f, "timestamp"),
            ValueKind::Text => write!(f, "text"),
            ValueKind::Mixed => write!(f, "mixed"),
        }
    }
}

// ============================================================================
// From implementations for Value
// ============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}
