//! Tabula Index - Key ordering and the primary-key index for Tabula tables.
//!
//! This crate provides:
//!
//! - `compare_values` / `compare_keys`: Total order over same-kind values and composite keys
//! - `PrimaryKeyIndex`: Sorted permutation of physical row positions, patched incrementally
//! - `KeySource`: The seam through which the index reads key tuples
//!
//! # Example
//!
//! ```rust
//! use tabula_core::Value;
//! use tabula_index::PrimaryKeyIndex;
//!
//! let rows = vec![
//!     vec![Value::from("first"), Value::Int64(10)],
//!     vec![Value::from("second"), Value::Int64(1)],
//!     vec![Value::from("aaa"), Value::Int64(10)],
//! ];
//! let index = PrimaryKeyIndex::build(&rows).unwrap();
//! assert_eq!(index.positions(), &[2, 0, 1]);
//!
//! let range = index.prefix_range(&rows, &[Value::from("first")]).unwrap();
//! assert_eq!(range, 1..2);
//! ```

#![no_std]

extern crate alloc;

pub mod comparator;
pub mod pk_index;

pub use comparator::{
    compare_f64, compare_f64_slices, compare_keys, compare_values, Comparator, KeyComparator,
    ValueComparator,
};
pub use pk_index::{KeySource, PrimaryKeyIndex};
