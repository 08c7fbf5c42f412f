//! Error types for Tabula.

use crate::types::DataType;
use crate::value::Value;
use core::fmt;

/// Result type alias for Tabula operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for table operations.
///
/// Every variant is recoverable: a failed call leaves the table as it was.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Value kind does not match the column kind.
    TypeMismatch {
        column: String,
        expected: DataType,
        got: DataType,
    },
    /// String or byte length above the column's `max_size`.
    SizeExceeded {
        column: String,
        max_size: usize,
        len: usize,
    },
    /// Null (or empty text) written to a non-nullable column.
    NullNotAllowed {
        column: String,
    },
    /// Row width differs from the column count.
    ColumnCountMismatch {
        expected: usize,
        got: usize,
    },
    /// Column not found.
    ColumnNotFound {
        table: String,
        column: String,
    },
    /// A column with this name already exists.
    ColumnExists {
        table: String,
        column: String,
    },
    /// Another row already holds this primary key.
    DuplicateKey {
        table: String,
        key: Vec<Value>,
    },
    /// Logical row position out of range.
    RowNotFound {
        table: String,
        row: usize,
    },
    /// Column layouts of two stores or tables differ.
    SchemaMismatch {
        message: String,
    },
    /// Comparison between values of different kinds.
    KindMismatch {
        left: DataType,
        right: DataType,
    },
    /// Column cannot take part in a primary key.
    InvalidKeyKind {
        column: String,
        message: String,
    },
    /// Text could not be decoded for the column's kind.
    InvalidText {
        column: String,
        text: String,
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TypeMismatch {
                column,
                expected,
                got,
            } => {
                write!(
                    f,
                    "Type mismatch on column {}: expected {}, got {}",
                    column, expected, got
                )
            }
            Error::SizeExceeded {
                column,
                max_size,
                len,
            } => {
                write!(
                    f,
                    "Value of length {} exceeds max size {} on column {}",
                    len, max_size, column
                )
            }
            Error::NullNotAllowed { column } => {
                write!(f, "Null not allowed on column: {}", column)
            }
            Error::ColumnCountMismatch { expected, got } => {
                write!(f, "Number of values {} != column count {}", got, expected)
            }
            Error::ColumnNotFound { table, column } => {
                write!(f, "Column {} not found in table {}", column, table)
            }
            Error::ColumnExists { table, column } => {
                write!(f, "Column {} already exists in table {}", column, table)
            }
            Error::DuplicateKey { table, key } => {
                write!(f, "Duplicate primary key in table {}: {:?}", table, key)
            }
            Error::RowNotFound { table, row } => {
                write!(f, "Row {} not found in table {}", row, table)
            }
            Error::SchemaMismatch { message } => {
                write!(f, "Schema mismatch: {}", message)
            }
            Error::KindMismatch { left, right } => {
                write!(f, "Cannot compare {} with {}", left, right)
            }
            Error::InvalidKeyKind { column, message } => {
                write!(f, "Column {} cannot be a key column: {}", column, message)
            }
            Error::InvalidText {
                column,
                text,
                message,
            } => {
                write!(
                    f,
                    "Cannot decode {:?} for column {}: {}",
                    text, column, message
                )
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Creates a type mismatch error.
    pub fn type_mismatch(column: impl Into<String>, expected: DataType, got: DataType) -> Self {
        Error::TypeMismatch {
            column: column.into(),
            expected,
            got,
        }
    }

    /// Creates a size exceeded error.
    pub fn size_exceeded(column: impl Into<String>, max_size: usize, len: usize) -> Self {
        Error::SizeExceeded {
            column: column.into(),
            max_size,
            len,
        }
    }

    /// Creates a null not allowed error.
    pub fn null_not_allowed(column: impl Into<String>) -> Self {
        Error::NullNotAllowed {
            column: column.into(),
        }
    }

    /// Creates a column count mismatch error.
    pub fn column_count_mismatch(expected: usize, got: usize) -> Self {
        Error::ColumnCountMismatch { expected, got }
    }

    /// Creates a column not found error.
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a column exists error.
    pub fn column_exists(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::ColumnExists {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a duplicate key error.
    pub fn duplicate_key(table: impl Into<String>, key: Vec<Value>) -> Self {
        Error::DuplicateKey {
            table: table.into(),
            key,
        }
    }

    /// Creates a row not found error.
    pub fn row_not_found(table: impl Into<String>, row: usize) -> Self {
        Error::RowNotFound {
            table: table.into(),
            row,
        }
    }

    /// Creates a schema mismatch error.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Error::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Creates a kind mismatch error.
    pub fn kind_mismatch(left: DataType, right: DataType) -> Self {
        Error::KindMismatch { left, right }
    }

    /// Creates an invalid key kind error.
    pub fn invalid_key_kind(column: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidKeyKind {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid text error.
    pub fn invalid_text(
        column: impl Into<String>,
        text: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Error::InvalidText {
            column: column.into(),
            text: text.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::type_mismatch("id", DataType::Int64, DataType::String);
        assert!(err.to_string().contains("Type mismatch"));
        assert!(err.to_string().contains("int64"));

        let err = Error::null_not_allowed("name");
        assert!(err.to_string().contains("name"));

        let err = Error::row_not_found("users", 7);
        assert!(err.to_string().contains("users"));

        let err = Error::kind_mismatch(DataType::Int64, DataType::Float64);
        assert_eq!(err.to_string(), "Cannot compare int64 with float64");
    }

    #[test]
    fn test_error_constructors() {
        let err = Error::duplicate_key("users", vec![Value::Int64(1)]);
        match err {
            Error::DuplicateKey { table, key } => {
                assert_eq!(table, "users");
                assert_eq!(key, vec![Value::Int64(1)]);
            }
            _ => panic!("Wrong error type"),
        }

        let err = Error::invalid_text("ts", "nope", "bad format");
        assert!(matches!(err, Error::InvalidText { ref message, .. } if message == "bad format"));
    }
}
