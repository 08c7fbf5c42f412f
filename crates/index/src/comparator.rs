//! Comparator implementations for index keys.
//!
//! Values of the same kind are totally ordered; `Null` sorts before everything.
//! Comparing two non-null values of different kinds is an error rather than an
//! arbitrary ordering, so every comparison is fallible.

use core::cmp::Ordering;
use tabula_core::{Error, Result, Value};

/// Trait for comparing index keys.
pub trait Comparator<K: ?Sized> {
    /// Compares two keys according to the comparator's ordering.
    fn compare(&self, a: &K, b: &K) -> Result<Ordering>;

    /// Returns true if a < b according to this comparator.
    fn is_less(&self, a: &K, b: &K) -> Result<bool> {
        Ok(self.compare(a, b)? == Ordering::Less)
    }

    /// Returns true if a <= b according to this comparator.
    fn is_less_or_equal(&self, a: &K, b: &K) -> Result<bool> {
        Ok(self.compare(a, b)? != Ordering::Greater)
    }

    /// Returns true if a == b according to this comparator.
    fn is_equal(&self, a: &K, b: &K) -> Result<bool> {
        Ok(self.compare(a, b)? == Ordering::Equal)
    }
}

/// Compares single values.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueComparator;

impl Comparator<Value> for ValueComparator {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        compare_values(a, b)
    }
}

/// Compares composite keys left to right.
///
/// A shorter key that is a prefix of a longer one compares less, which makes
/// a key prefix the lower bound of every key that starts with it.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyComparator;

impl Comparator<[Value]> for KeyComparator {
    fn compare(&self, a: &[Value], b: &[Value]) -> Result<Ordering> {
        compare_keys(a, b)
    }
}

/// Compares two values. `Null` is less than any non-null value.
pub fn compare_values(a: &Value, b: &Value) -> Result<Ordering> {
    let ord = match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::Int64(x), Value::Int64(y)) => x.cmp(y),
        (Value::Float64(x), Value::Float64(y)) => compare_f64(*x, *y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::Bytes(x), Value::Bytes(y)) => x.cmp(y),
        (Value::BooleanArray(x), Value::BooleanArray(y)) => x.cmp(y),
        (Value::Int64Array(x), Value::Int64Array(y)) => x.cmp(y),
        (Value::Float64Array(x), Value::Float64Array(y)) => compare_f64_slices(x, y),
        (Value::StringArray(x), Value::StringArray(y)) => x.cmp(y),
        (Value::TimestampArray(x), Value::TimestampArray(y)) => x.cmp(y),
        (Value::BytesArray(x), Value::BytesArray(y)) => x.cmp(y),
        (x, y) => {
            // Both sides are non-null here.
            let (Some(left), Some(right)) = (x.data_type(), y.data_type()) else {
                unreachable!("null handled above")
            };
            return Err(Error::kind_mismatch(left, right));
        }
    };
    Ok(ord)
}

/// Compares two composite keys component by component.
pub fn compare_keys(a: &[Value], b: &[Value]) -> Result<Ordering> {
    for (x, y) in a.iter().zip(b) {
        match compare_values(x, y)? {
            Ordering::Equal => continue,
            ord => return Ok(ord),
        }
    }
    Ok(a.len().cmp(&b.len()))
}

/// NaN sorts after every number and equals itself.
#[inline]
pub fn compare_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Lexicographic order over float slices using [`compare_f64`].
pub fn compare_f64_slices(a: &[f64], b: &[f64]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match compare_f64(*x, *y) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    a.len().cmp(&b.len())
}
