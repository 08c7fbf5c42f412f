//! Columnar storage for Tabula tables.
//!
//! This module provides the `ColumnStore` struct which keeps one typed vector per
//! column. All columns have the same length, and position `i` of every column
//! belongs to the same physical row.

use core::cmp::Ordering;

use tabula_core::{DataType, Error, Result, StorageKind, Value};
use tabula_index::{compare_f64, compare_f64_slices};

/// A stored cell. `None` marks an absent value in a nullable column.
pub type Cell = Option<Value>;

/// Slots of one column: plain values for required columns, optional values otherwise.
#[derive(Clone, Debug, PartialEq)]
pub enum Slots<T> {
    Required(Vec<T>),
    Optional(Vec<Option<T>>),
}

impl<T: Clone> Slots<T> {
    fn new(nullable: bool) -> Self {
        if nullable {
            Slots::Optional(Vec::new())
        } else {
            Slots::Required(Vec::new())
        }
    }

    #[inline]
    fn is_optional(&self) -> bool {
        matches!(self, Slots::Optional(_))
    }

    #[inline]
    fn len(&self) -> usize {
        match self {
            Slots::Required(v) => v.len(),
            Slots::Optional(v) => v.len(),
        }
    }

    #[inline]
    fn get(&self, pos: usize) -> Option<&T> {
        match self {
            Slots::Required(v) => Some(&v[pos]),
            Slots::Optional(v) => v[pos].as_ref(),
        }
    }

    fn push(&mut self, value: Option<T>) {
        match (self, value) {
            (Slots::Required(v), Some(x)) => v.push(x),
            (Slots::Optional(v), x) => v.push(x),
            (Slots::Required(_), None) => unreachable!("absent cell in a required column"),
        }
    }

    fn set(&mut self, pos: usize, value: Option<T>) {
        match (self, value) {
            (Slots::Required(v), Some(x)) => v[pos] = x,
            (Slots::Optional(v), x) => v[pos] = x,
            (Slots::Required(_), None) => unreachable!("absent cell in a required column"),
        }
    }

    fn swap_remove(&mut self, pos: usize) -> Option<T> {
        match self {
            Slots::Required(v) => Some(v.swap_remove(pos)),
            Slots::Optional(v) => v.swap_remove(pos),
        }
    }

    fn extend_from(&mut self, other: &Self) {
        match (self, other) {
            (Slots::Required(a), Slots::Required(b)) => a.extend_from_slice(b),
            (Slots::Optional(a), Slots::Optional(b)) => a.extend_from_slice(b),
            _ => unreachable!("storage kinds checked before merge"),
        }
    }

    fn clear(&mut self) {
        match self {
            Slots::Required(v) => v.clear(),
            Slots::Optional(v) => v.clear(),
        }
    }
}

/// Order of stored slot values, agreeing with `compare_values` on the matching variant.
trait SlotOrd {
    fn slot_cmp(&self, other: &Self) -> Ordering;
}

macro_rules! slot_ord {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SlotOrd for $ty {
                #[inline]
                fn slot_cmp(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }
            }
        )*
    };
}

slot_ord!(bool, i64, String, Vec<u8>, Vec<bool>, Vec<i64>, Vec<String>, Vec<Vec<u8>>);

impl SlotOrd for f64 {
    #[inline]
    fn slot_cmp(&self, other: &Self) -> Ordering {
        compare_f64(*self, *other)
    }
}

impl SlotOrd for Vec<f64> {
    #[inline]
    fn slot_cmp(&self, other: &Self) -> Ordering {
        compare_f64_slices(self, other)
    }
}

/// Absent cells sort first.
#[inline]
fn compare_slots<T: SlotOrd>(a: Option<&T>, b: Option<&T>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.slot_cmp(y),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

macro_rules! column_data {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// Typed storage of one column, one variant per logical kind.
        #[derive(Clone, Debug, PartialEq)]
        pub enum ColumnData {
            $($variant(Slots<$ty>),)*
        }

        impl ColumnData {
            /// Creates an empty column for a storage kind.
            pub fn new(kind: StorageKind) -> Self {
                let nullable = kind.is_nullable();
                match kind.data_type() {
                    $(DataType::$variant => ColumnData::$variant(Slots::new(nullable)),)*
                }
            }

            /// Returns the storage kind of this column.
            pub fn storage_kind(&self) -> StorageKind {
                match self {
                    $(ColumnData::$variant(s) => StorageKind::new(DataType::$variant, s.is_optional()),)*
                }
            }

            /// Returns the number of slots.
            pub fn len(&self) -> usize {
                match self {
                    $(ColumnData::$variant(s) => s.len(),)*
                }
            }

            /// Returns true if the column has no slots.
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Returns the cell at a position.
            pub fn get(&self, pos: usize) -> Cell {
                match self {
                    $(ColumnData::$variant(s) => s.get(pos).map(|v| Value::$variant(v.clone())),)*
                }
            }

            /// Compares the cell at `pos` with `value` without copying the cell.
            pub fn compare_at(&self, pos: usize, value: &Value) -> Result<Ordering> {
                match (self, value) {
                    $((ColumnData::$variant(s), Value::$variant(v)) => {
                        return Ok(compare_slots(s.get(pos), Some(v)));
                    })*
                    _ => {}
                }
                if self.is_absent(pos) {
                    return Ok(if value.is_null() { Ordering::Equal } else { Ordering::Less });
                }
                match value.data_type() {
                    Some(other) => Err(Error::kind_mismatch(self.storage_kind().data_type(), other)),
                    None => Ok(Ordering::Greater),
                }
            }

            /// Compares the cells at two positions.
            pub fn compare_positions(&self, a: usize, b: usize) -> Ordering {
                match self {
                    $(ColumnData::$variant(s) => compare_slots(s.get(a), s.get(b)),)*
                }
            }

            fn is_absent(&self, pos: usize) -> bool {
                match self {
                    $(ColumnData::$variant(s) => s.get(pos).is_none(),)*
                }
            }

            fn push(&mut self, cell: Cell) {
                match (self, cell) {
                    $(
                        (ColumnData::$variant(s), Some(Value::$variant(v))) => s.push(Some(v)),
                        (ColumnData::$variant(s), None) => s.push(None),
                    )*
                    _ => unreachable!("cell checked against storage kind"),
                }
            }

            fn set(&mut self, pos: usize, cell: Cell) {
                match (self, cell) {
                    $(
                        (ColumnData::$variant(s), Some(Value::$variant(v))) => s.set(pos, Some(v)),
                        (ColumnData::$variant(s), None) => s.set(pos, None),
                    )*
                    _ => unreachable!("cell checked against storage kind"),
                }
            }

            fn swap_remove(&mut self, pos: usize) -> Cell {
                match self {
                    $(ColumnData::$variant(s) => s.swap_remove(pos).map(Value::$variant),)*
                }
            }

            fn extend_from(&mut self, other: &ColumnData) {
                match (self, other) {
                    $((ColumnData::$variant(a), ColumnData::$variant(b)) => a.extend_from(b),)*
                    _ => unreachable!("storage kinds checked before merge"),
                }
            }

            fn clear(&mut self) {
                match self {
                    $(ColumnData::$variant(s) => s.clear(),)*
                }
            }
        }
    };
}

column_data! {
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    Timestamp(i64),
    Bytes(Vec<u8>),
    BooleanArray(Vec<bool>),
    Int64Array(Vec<i64>),
    Float64Array(Vec<f64>),
    StringArray(Vec<String>),
    TimestampArray(Vec<i64>),
    BytesArray(Vec<Vec<u8>>),
}

/// Column-oriented row storage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnStore {
    columns: Vec<ColumnData>,
    len: usize,
}

impl ColumnStore {
    /// Creates an empty store with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the given column kinds.
    pub fn with_kinds(kinds: impl IntoIterator<Item = StorageKind>) -> Self {
        let mut store = Self::new();
        for kind in kinds {
            store.add_column(kind);
        }
        store
    }

    /// Returns the number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the store holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the storage kinds of all columns.
    pub fn storage_kinds(&self) -> Vec<StorageKind> {
        self.columns.iter().map(ColumnData::storage_kind).collect()
    }

    /// Returns a column's typed data.
    pub fn column(&self, col: usize) -> Option<&ColumnData> {
        self.columns.get(col)
    }

    /// Adds a column filled with the kind's stored zero up to the current length.
    pub fn add_column(&mut self, kind: StorageKind) {
        let zero = if kind.is_nullable() {
            None
        } else {
            Some(Value::default_for_type(kind.data_type()))
        };
        let mut data = ColumnData::new(kind);
        for _ in 0..self.len {
            data.push(zero.clone());
        }
        self.columns.push(data);
    }

    /// Appends a row and returns its physical position.
    pub fn append_row(&mut self, cells: Vec<Cell>) -> Result<usize> {
        self.check_cells(&cells)?;
        for (data, cell) in self.columns.iter_mut().zip(cells) {
            data.push(cell);
        }
        self.len += 1;
        Ok(self.len - 1)
    }

    /// Returns the cells of a row.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    pub fn get_row(&self, pos: usize) -> Vec<Cell> {
        self.columns.iter().map(|data| data.get(pos)).collect()
    }

    /// Returns a single cell.
    ///
    /// # Panics
    ///
    /// Panics if `col` or `pos` is out of bounds.
    pub fn get(&self, col: usize, pos: usize) -> Cell {
        self.columns[col].get(pos)
    }

    /// Compares a single cell with a value, as `compare_values` would.
    ///
    /// # Panics
    ///
    /// Panics if `col` or `pos` is out of bounds.
    pub fn compare_cell(&self, col: usize, pos: usize, value: &Value) -> Result<Ordering> {
        self.columns[col].compare_at(pos, value)
    }

    /// Compares the cells of one column at two positions.
    pub fn compare_rows(&self, col: usize, a: usize, b: usize) -> Ordering {
        self.columns[col].compare_positions(a, b)
    }

    /// Overwrites every cell of a row.
    pub fn set_row(&mut self, pos: usize, cells: Vec<Cell>) -> Result<()> {
        self.check_cells(&cells)?;
        for (data, cell) in self.columns.iter_mut().zip(cells) {
            data.set(pos, cell);
        }
        Ok(())
    }

    /// Removes a row by moving the last row into its slot. Returns the removed cells.
    pub fn remove_row(&mut self, pos: usize) -> Vec<Cell> {
        let removed = self
            .columns
            .iter_mut()
            .map(|data| data.swap_remove(pos))
            .collect();
        self.len -= 1;
        removed
    }

    /// Checks that `other` has the same column count and storage kinds.
    pub fn check_compatible(&self, other: &ColumnStore) -> Result<()> {
        if self.columns.len() != other.columns.len() {
            return Err(Error::schema_mismatch(format!(
                "cannot merge {} columns into {}",
                other.columns.len(),
                self.columns.len()
            )));
        }
        for (i, (a, b)) in self.columns.iter().zip(&other.columns).enumerate() {
            if a.storage_kind() != b.storage_kind() {
                return Err(Error::schema_mismatch(format!(
                    "column {} is {} but {} was given",
                    i,
                    a.storage_kind(),
                    b.storage_kind()
                )));
            }
        }
        Ok(())
    }

    /// Appends every row of `other` after this store's rows.
    pub fn merge(&mut self, other: &ColumnStore) -> Result<()> {
        self.check_compatible(other)?;
        for (a, b) in self.columns.iter_mut().zip(&other.columns) {
            a.extend_from(b);
        }
        self.len += other.len;
        Ok(())
    }

    /// Drops all rows and keeps the columns.
    pub fn clear(&mut self) {
        for data in &mut self.columns {
            data.clear();
        }
        self.len = 0;
    }

    fn check_cells(&self, cells: &[Cell]) -> Result<()> {
        if cells.len() != self.columns.len() {
            return Err(Error::column_count_mismatch(self.columns.len(), cells.len()));
        }
        for (i, (data, cell)) in self.columns.iter().zip(cells).enumerate() {
            let kind = data.storage_kind();
            match cell {
                None if kind.is_nullable() => {}
                None | Some(Value::Null) => return Err(Error::null_not_allowed(i.to_string())),
                Some(value) => {
                    if let Some(dt) = value.data_type().filter(|dt| *dt != kind.data_type()) {
                        return Err(Error::type_mismatch(i.to_string(), kind.data_type(), dt));
                    }
                }
            }
        }
        Ok(())
    }
}
