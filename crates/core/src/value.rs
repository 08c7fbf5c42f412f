//! Value type definitions for Tabula.
//!
//! This module defines the `Value` enum which represents any value that can be stored
//! in a table cell, plus the per-kind zero table.

use crate::types::DataType;
use core::hash::{Hash, Hasher};

/// A value that can be stored in a table cell.
#[derive(Clone, Debug)]
pub enum Value {
    /// Absent value, only legal in nullable columns
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    /// Nanoseconds since the Unix epoch, UTC
    Timestamp(i64),
    Bytes(Vec<u8>),
    BooleanArray(Vec<bool>),
    Int64Array(Vec<i64>),
    Float64Array(Vec<f64>),
    StringArray(Vec<String>),
    TimestampArray(Vec<i64>),
    BytesArray(Vec<Vec<u8>>),
}

impl Value {
    /// Returns the data type of this value, or None if it's Null.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::String(_) => Some(DataType::String),
            Value::Timestamp(_) => Some(DataType::Timestamp),
            Value::Bytes(_) => Some(DataType::Bytes),
            Value::BooleanArray(_) => Some(DataType::BooleanArray),
            Value::Int64Array(_) => Some(DataType::Int64Array),
            Value::Float64Array(_) => Some(DataType::Float64Array),
            Value::StringArray(_) => Some(DataType::StringArray),
            Value::TimestampArray(_) => Some(DataType::TimestampArray),
            Value::BytesArray(_) => Some(DataType::BytesArray),
        }
    }

    /// Returns true if this value is Null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean value if this is a Boolean, None otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the i64 value if this is an Int64, None otherwise.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the f64 value if this is a Float64, None otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a String, None otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Returns the nanosecond timestamp if this is a Timestamp, None otherwise.
    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a reference to the bytes if this is Bytes, None otherwise.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Returns the number of elements if this is a sequence kind.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Value::BooleanArray(v) => Some(v.len()),
            Value::Int64Array(v) => Some(v.len()),
            Value::Float64Array(v) => Some(v.len()),
            Value::StringArray(v) => Some(v.len()),
            Value::TimestampArray(v) => Some(v.len()),
            Value::BytesArray(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Returns the largest character/byte length held by a sized value.
    ///
    /// For `String`/`Bytes` this is the length itself, for their arrays the longest element.
    /// Other kinds return `None`.
    pub fn max_len(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.len()),
            Value::Bytes(b) => Some(b.len()),
            Value::StringArray(v) => Some(v.iter().map(String::len).max().unwrap_or(0)),
            Value::BytesArray(v) => Some(v.iter().map(Vec::len).max().unwrap_or(0)),
            _ => None,
        }
    }

    /// Creates the zero value for the given data type.
    pub fn default_for_type(dt: DataType) -> Self {
        match dt {
            DataType::Boolean => Value::Boolean(false),
            DataType::Int64 => Value::Int64(0),
            DataType::Float64 => Value::Float64(0.0),
            DataType::String => Value::String(String::new()),
            DataType::Timestamp => Value::Timestamp(0),
            DataType::Bytes => Value::Bytes(Vec::new()),
            DataType::BooleanArray => Value::BooleanArray(Vec::new()),
            DataType::Int64Array => Value::Int64Array(Vec::new()),
            DataType::Float64Array => Value::Float64Array(Vec::new()),
            DataType::StringArray => Value::StringArray(Vec::new()),
            DataType::TimestampArray => Value::TimestampArray(Vec::new()),
            DataType::BytesArray => Value::BytesArray(Vec::new()),
        }
    }
}

#[inline]
fn float_eq(a: f64, b: f64) -> bool {
    // NaN equals NaN so that stored rows compare equal to themselves
    (a.is_nan() && b.is_nan()) || a == b
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => float_eq(*a, *b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::BooleanArray(a), Value::BooleanArray(b)) => a == b,
            (Value::Int64Array(a), Value::Int64Array(b)) => a == b,
            (Value::Float64Array(a), Value::Float64Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| float_eq(*x, *y))
            }
            (Value::StringArray(a), Value::StringArray(b)) => a == b,
            (Value::TimestampArray(a), Value::TimestampArray(b)) => a == b,
            (Value::BytesArray(a), Value::BytesArray(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

/// Hash bits consistent with `float_eq`: every NaN and both zeros collapse.
#[inline]
fn float_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0
    } else {
        f.to_bits()
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Int64(i) => i.hash(state),
            Value::Float64(f) => float_bits(*f).hash(state),
            Value::String(s) => s.hash(state),
            Value::Timestamp(t) => t.hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::BooleanArray(v) => v.hash(state),
            Value::Int64Array(v) => v.hash(state),
            Value::Float64Array(v) => {
                v.len().hash(state);
                for f in v {
                    float_bits(*f).hash(state);
                }
            }
            Value::StringArray(v) => v.hash(state),
            Value::TimestampArray(v) => v.hash(state),
            Value::BytesArray(v) => v.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Vec<bool>> for Value {
    fn from(v: Vec<bool>) -> Self {
        Value::BooleanArray(v)
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::Int64Array(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Float64Array(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::StringArray(v)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::StringArray(v.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<Vec<u8>>> for Value {
    fn from(v: Vec<Vec<u8>>) -> Self {
        Value::BytesArray(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}
