//! Schema module for Tabula.
//!
//! Column descriptors: logical kind, nullability, size limit and the
//! conversions between logical values, stored cells and text.

mod column;

pub use column::Column;
