//! Data type definitions for Tabula.
//!
//! This module defines the closed set of logical kinds a column can hold.

use core::fmt;

/// Logical kind of a column.
///
/// Every scalar kind has a homogeneous sequence counterpart (`*Array`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean (false < true)
    Boolean,
    /// 64-bit signed integer
    Int64,
    /// 64-bit floating point number
    Float64,
    /// UTF-8 string
    String,
    /// Nanoseconds since the Unix epoch, UTC
    Timestamp,
    /// Binary data
    Bytes,
    BooleanArray,
    Int64Array,
    Float64Array,
    StringArray,
    TimestampArray,
    BytesArray,
}

impl DataType {
    /// All logical kinds, scalars first.
    pub const ALL: [DataType; 12] = [
        DataType::Boolean,
        DataType::Int64,
        DataType::Float64,
        DataType::String,
        DataType::Timestamp,
        DataType::Bytes,
        DataType::BooleanArray,
        DataType::Int64Array,
        DataType::Float64Array,
        DataType::StringArray,
        DataType::TimestampArray,
        DataType::BytesArray,
    ];

    /// Returns whether this kind is a homogeneous sequence.
    pub fn is_array(&self) -> bool {
        self.element_type() != *self
    }

    /// Returns the element kind of a sequence, or the kind itself for scalars.
    pub fn element_type(&self) -> DataType {
        match self {
            DataType::BooleanArray => DataType::Boolean,
            DataType::Int64Array => DataType::Int64,
            DataType::Float64Array => DataType::Float64,
            DataType::StringArray => DataType::String,
            DataType::TimestampArray => DataType::Timestamp,
            DataType::BytesArray => DataType::Bytes,
            scalar => *scalar,
        }
    }

    /// Returns the sequence kind whose elements are of this kind.
    ///
    /// Sequences of sequences are not supported, so array kinds return `None`.
    pub fn array_of(&self) -> Option<DataType> {
        match self {
            DataType::Boolean => Some(DataType::BooleanArray),
            DataType::Int64 => Some(DataType::Int64Array),
            DataType::Float64 => Some(DataType::Float64Array),
            DataType::String => Some(DataType::StringArray),
            DataType::Timestamp => Some(DataType::TimestampArray),
            DataType::Bytes => Some(DataType::BytesArray),
            _ => None,
        }
    }

    /// Returns whether `max_size` applies to this kind (or to its elements).
    pub fn is_sized(&self) -> bool {
        matches!(self.element_type(), DataType::String | DataType::Bytes)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "boolean",
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::String => "string",
            DataType::Timestamp => "timestamp",
            DataType::Bytes => "bytes",
            DataType::BooleanArray => "boolean[]",
            DataType::Int64Array => "int64[]",
            DataType::Float64Array => "float64[]",
            DataType::StringArray => "string[]",
            DataType::TimestampArray => "timestamp[]",
            DataType::BytesArray => "bytes[]",
        };
        f.write_str(name)
    }
}

/// Physical representation kept in the columnar store for one column.
///
/// Nullable columns wrap their logical kind in an optional slot; non-nullable
/// columns store the logical kind directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Required(DataType),
    Optional(DataType),
}

impl StorageKind {
    /// Creates the storage kind for a logical kind and nullability.
    pub fn new(data_type: DataType, nullable: bool) -> Self {
        if nullable {
            StorageKind::Optional(data_type)
        } else {
            StorageKind::Required(data_type)
        }
    }

    /// Returns the wrapped logical kind.
    #[inline]
    pub fn data_type(&self) -> DataType {
        match self {
            StorageKind::Required(dt) | StorageKind::Optional(dt) => *dt,
        }
    }

    /// Returns whether absent cells can be stored.
    #[inline]
    pub fn is_nullable(&self) -> bool {
        matches!(self, StorageKind::Optional(_))
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Required(dt) => write!(f, "{}", dt),
            StorageKind::Optional(dt) => write!(f, "{}?", dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_and_array_kinds() {
        for dt in DataType::ALL {
            if dt.is_array() {
                assert_eq!(dt.element_type().array_of(), Some(dt));
                assert_eq!(dt.array_of(), None);
            } else {
                assert_eq!(dt.element_type(), dt);
                assert_eq!(dt.array_of().map(|a| a.element_type()), Some(dt));
            }
        }
    }

    #[test]
    fn test_sized_kinds() {
        assert!(DataType::String.is_sized());
        assert!(DataType::BytesArray.is_sized());
        assert!(!DataType::Int64.is_sized());
        assert!(!DataType::TimestampArray.is_sized());
    }

    #[test]
    fn test_display() {
        assert_eq!(DataType::Int64.to_string(), "int64");
        assert_eq!(DataType::StringArray.to_string(), "string[]");
        assert_eq!(StorageKind::new(DataType::Bytes, true).to_string(), "bytes?");
    }

    #[test]
    fn test_storage_kind() {
        let required = StorageKind::new(DataType::Int64, false);
        let optional = StorageKind::new(DataType::Int64, true);
        assert_eq!(required, StorageKind::Required(DataType::Int64));
        assert!(!required.is_nullable());
        assert!(optional.is_nullable());
        assert_eq!(optional.data_type(), DataType::Int64);
        assert_ne!(required, optional);
    }
}
