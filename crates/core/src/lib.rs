//! Tabula Core - Core types and column descriptors for the Tabula table engine.
//!
//! This crate provides the foundational types:
//!
//! - `DataType`: Logical kinds (six scalars and their homogeneous sequences)
//! - `StorageKind`: Physical representation of a column (required or optional slots)
//! - `Value`: Runtime values that can be stored in a cell
//! - `schema::Column`: Column descriptor with validation, cell encoding and text marshaling
//! - `Error`: Error types for table operations
//!
//! # Example
//!
//! ```rust
//! use tabula_core::{DataType, Value};
//! use tabula_core::schema::Column;
//!
//! let col = Column::new("tags", DataType::StringArray).nullable(true);
//!
//! let cell = col.encode(Value::from(vec!["a", "b c"])).unwrap();
//! assert_eq!(col.decode(cell), Value::from(vec!["a", "b c"]));
//!
//! let text = col.text_encode(&Value::from(vec!["a", "b c"]));
//! assert_eq!(text, "{a,\"b c\"}");
//! assert_eq!(col.text_decode("").unwrap(), Value::Null);
//! ```

mod error;
pub mod schema;
mod text;
mod types;
mod value;

pub use error::{Error, Result};
pub use types::{DataType, StorageKind};
pub use value::Value;
