//! Column descriptor for Tabula tables.

use crate::error::{Error, Result};
use crate::text;
use crate::types::{DataType, StorageKind};
use crate::value::Value;

/// A column definition in a table.
///
/// Describes the logical kind, nullability and optional size limit of one column,
/// and converts values between their logical form and the stored cell form
/// (`Option<Value>`, where `None` marks absence in a nullable column).
#[derive(Clone, Debug)]
pub struct Column {
    /// Column name.
    name: String,
    /// Logical kind of the column.
    data_type: DataType,
    /// Whether this column allows null values.
    nullable: bool,
    /// Maximum character/byte length for string and bytes kinds.
    max_size: Option<usize>,
    /// Column position in the table (0-based), fixed when the column is added.
    index: usize,
}

impl Column {
    /// Creates a new non-nullable column definition.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
            max_size: None,
            index: 0,
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Boolean)
    }

    pub fn int64(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Int64)
    }

    pub fn float64(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Float64)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, DataType::String)
    }

    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Timestamp)
    }

    pub fn bytes(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Bytes)
    }

    /// Sets whether this column is nullable.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets the maximum length of string/bytes values. Zero means unlimited.
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = (max_size > 0).then_some(max_size);
        self
    }

    /// Sets the column position. Tables assign this when the column is added.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Returns the column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the logical kind.
    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns whether this column is nullable.
    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns the size limit, if any.
    #[inline]
    pub fn get_max_size(&self) -> Option<usize> {
        self.max_size
    }

    /// Returns the column index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the physical representation used by the columnar store.
    #[inline]
    pub fn storage_kind(&self) -> StorageKind {
        StorageKind::new(self.data_type, self.nullable)
    }

    /// Returns the absent/default value: `Null` for nullable columns,
    /// the zero of the logical kind otherwise.
    pub fn zero_value(&self) -> Value {
        if self.nullable {
            Value::Null
        } else {
            Value::default_for_type(self.data_type)
        }
    }

    /// Returns the stored cell for [`zero_value`](Self::zero_value).
    pub fn stored_zero(&self) -> Option<Value> {
        if self.nullable {
            None
        } else {
            Some(Value::default_for_type(self.data_type))
        }
    }

    /// Checks a logical value against this column's kind, nullability and size limit.
    pub fn validate(&self, value: &Value) -> Result<()> {
        let got = match value.data_type() {
            None if self.nullable => return Ok(()),
            None => return Err(Error::null_not_allowed(&self.name)),
            Some(dt) => dt,
        };
        if got != self.data_type {
            return Err(Error::type_mismatch(&self.name, self.data_type, got));
        }
        if let (Some(max_size), Some(len)) = (self.max_size, value.max_len()) {
            if len > max_size {
                return Err(Error::size_exceeded(&self.name, max_size, len));
            }
        }
        Ok(())
    }

    /// Validates a logical value and converts it to its stored cell.
    pub fn encode(&self, value: Value) -> Result<Option<Value>> {
        self.validate(&value)?;
        Ok(match value {
            Value::Null => None,
            v => Some(v),
        })
    }

    /// Converts a stored cell back to its logical value.
    #[inline]
    pub fn decode(&self, cell: Option<Value>) -> Value {
        cell.unwrap_or(Value::Null)
    }

    /// Encodes a value to its text form. `Null` encodes to the empty string.
    pub fn text_encode(&self, value: &Value) -> String {
        text::encode(value)
    }

    /// Decodes text into a value of this column's kind.
    ///
    /// Empty text is `Null` on nullable columns and fails with `NullNotAllowed` otherwise.
    pub fn text_decode(&self, text: &str) -> Result<Value> {
        if text.is_empty() {
            if self.nullable {
                return Ok(Value::Null);
            }
            return Err(Error::null_not_allowed(&self.name));
        }
        let value = text::decode(self.data_type, text)
            .map_err(|message| Error::invalid_text(&self.name, text, message))?;
        self.validate(&value)?;
        Ok(value)
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.data_type == other.data_type
            && self.nullable == other.nullable
            && self.max_size == other.max_size
    }
}
