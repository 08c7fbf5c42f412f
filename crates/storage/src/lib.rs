//! Tabula Storage - Columnar tables with a primary-key index and change tracking.
//!
//! This crate provides the storage layer including:
//!
//! - `ColumnStore`: Typed per-column vectors addressed by physical row position
//! - `Table`: Row CRUD, key lookup and prefix search over a `PrimaryKeyIndex`
//! - `TableChange`: Inserted, updated and deleted rows since the last checkpoint
//! - `TableBuilder`: Builder-style table configuration
//!
//! # Example
//!
//! ```rust
//! use tabula_core::schema::Column;
//! use tabula_core::Value;
//! use tabula_storage::TableBuilder;
//!
//! let mut table = TableBuilder::new("items")
//!     .column(Column::string("name"))
//!     .unwrap()
//!     .column(Column::int64("id"))
//!     .unwrap()
//!     .primary_key(&["name", "id"])
//!     .unwrap()
//!     .build();
//!
//! table.add_row(vec![Value::from("first"), Value::Int64(10)]).unwrap();
//! table.add_row(vec![Value::from("second"), Value::Int64(1)]).unwrap();
//! table.accept_change();
//!
//! table.set_values(0, vec![Value::from("first"), Value::Int64(11)]).unwrap();
//! table.delete_row(1).unwrap();
//!
//! let change = table.get_change();
//! assert_eq!(change.updated.len(), 1);
//! assert_eq!(change.deleted.len(), 1);
//! assert_eq!(table.search(&[Value::from("first")]).len(), 1);
//! ```

pub mod change;
pub mod column_store;
pub mod table;

pub use change::{Record, RowStatus, TableChange, UpdatedRow};
pub use column_store::{Cell, ColumnData, ColumnStore, Slots};
pub use table::{Table, TableBuilder};
