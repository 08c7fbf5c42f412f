//! In-memory columnar table with a primary-key index and change tracking.
//!
//! Rows live in a [`ColumnStore`] at physical positions. When a primary key is set,
//! a [`PrimaryKeyIndex`] maps logical positions (key order) to physical ones;
//! otherwise logical and physical positions coincide. Every public row argument
//! is a logical position.

use core::cmp::Ordering;
use core::ops::Range;

use hashbrown::HashMap;
use tabula_core::schema::Column;
use tabula_core::{Error, Result, Value};
use tabula_index::{KeySource, PrimaryKeyIndex};
use tracing::{debug, trace};

use crate::change::{Record, RowStatus, TableChange, UpdatedRow};
use crate::column_store::{Cell, ColumnStore};

/// Stored cells of one row.
type StoredRow = Vec<Cell>;

/// Reads primary-key tuples straight out of a column store.
struct KeyView<'a> {
    store: &'a ColumnStore,
    columns: &'a [usize],
}

impl<'a> KeyView<'a> {
    fn new(store: &'a ColumnStore, columns: &'a [usize]) -> Self {
        Self { store, columns }
    }

    /// Compares components left to right until one differs or either side ends.
    fn compare_components(&self, physical: usize, key: &[Value]) -> Result<Ordering> {
        for (&c, value) in self.columns.iter().zip(key) {
            match self.store.compare_cell(c, physical, value)? {
                Ordering::Equal => continue,
                ord => return Ok(ord),
            }
        }
        Ok(Ordering::Equal)
    }
}

impl KeySource for KeyView<'_> {
    fn row_count(&self) -> usize {
        self.store.len()
    }

    fn key(&self, physical: usize) -> Vec<Value> {
        self.columns
            .iter()
            .map(|&c| self.store.get(c, physical).unwrap_or(Value::Null))
            .collect()
    }

    fn compare_key(&self, physical: usize, key: &[Value]) -> Result<Ordering> {
        match self.compare_components(physical, key)? {
            Ordering::Equal => Ok(self.columns.len().cmp(&key.len())),
            ord => Ok(ord),
        }
    }

    fn compare_head(&self, physical: usize, prefix: &[Value]) -> Result<Ordering> {
        match self.compare_components(physical, prefix)? {
            Ordering::Equal if self.columns.len() < prefix.len() => Ok(Ordering::Less),
            ord => Ok(ord),
        }
    }

    fn compare_positions(&self, a: usize, b: usize) -> Result<Ordering> {
        for &c in self.columns {
            match self.store.compare_rows(c, a, b) {
                Ordering::Equal => continue,
                ord => return Ok(ord),
            }
        }
        Ok(Ordering::Equal)
    }
}

/// An in-memory table.
#[derive(Clone, Debug)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    column_map: HashMap<String, usize>,
    primary_key: Vec<usize>,
    store: ColumnStore,
    /// Present exactly when a primary key is set.
    index: Option<PrimaryKeyIndex>,
    /// Per physical row.
    status: Vec<RowStatus>,
    /// Per physical row; `Some` only for `Updated` rows.
    origin: Vec<Option<StoredRow>>,
    /// Prior images of rows deleted since the last checkpoint.
    deleted: ColumnStore,
    changed: bool,
}

impl Table {
    /// Creates an empty table with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            column_map: HashMap::new(),
            primary_key: Vec::new(),
            store: ColumnStore::new(),
            index: None,
            status: Vec::new(),
            origin: Vec::new(),
            deleted: ColumnStore::new(),
            changed: false,
        }
    }

    // ---- schema ----

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in position order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    /// Returns the position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_map.get(name).copied()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.store.len()
    }

    /// Returns true if the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns the primary-key column names in key order.
    pub fn primary_key(&self) -> Vec<&str> {
        self.primary_key
            .iter()
            .map(|&c| self.columns[c].name())
            .collect()
    }

    pub fn has_primary_key(&self) -> bool {
        !self.primary_key.is_empty()
    }

    /// Returns true if the named column is part of the primary key.
    pub fn is_primary_key(&self, name: &str) -> bool {
        self.column_index(name)
            .map_or(false, |c| self.primary_key.contains(&c))
    }

    /// Appends a column. Existing rows, origin images and the delete log receive its zero value.
    pub fn add_column(&mut self, column: Column) -> Result<&Column> {
        if self.column_map.contains_key(column.name()) {
            return Err(Error::column_exists(&self.name, column.name()));
        }
        let position = self.columns.len();
        let column = column.with_index(position);
        let kind = column.storage_kind();

        self.store.add_column(kind);
        self.deleted.add_column(kind);
        let zero = column.stored_zero();
        for image in self.origin.iter_mut().flatten() {
            image.push(zero.clone());
        }

        debug!(table = %self.name, column = %column.name(), kind = %kind, "added column");
        self.column_map.insert(column.name().to_string(), position);
        self.columns.push(column);
        Ok(&self.columns[position])
    }

    /// Replaces the primary key and rebuilds the index. An empty list removes the key.
    ///
    /// Key columns must be non-nullable, and the existing rows must have distinct
    /// key tuples; on `DuplicateKey` the previous key and index stay in place.
    /// Statuses and origin images are tied to physical positions, so pending
    /// changes survive the rebuild unchanged, but callers should checkpoint first
    /// so the reconciled store sees a stable key.
    pub fn set_primary_key(&mut self, names: &[&str]) -> Result<()> {
        let mut key = Vec::with_capacity(names.len());
        for name in names {
            let c = self
                .column_index(name)
                .ok_or_else(|| Error::column_not_found(&self.name, *name))?;
            if self.columns[c].is_nullable() {
                return Err(Error::invalid_key_kind(
                    *name,
                    "primary key columns must not be nullable",
                ));
            }
            key.push(c);
        }

        if key.is_empty() {
            self.primary_key.clear();
            self.index = None;
            debug!(table = %self.name, "removed primary key");
            return Ok(());
        }

        let view = KeyView::new(&self.store, &key);
        let index = PrimaryKeyIndex::build(&view)?;
        if let Some(logical) = index.first_duplicate(&view)? {
            return Err(Error::duplicate_key(&self.name, view.key(index.physical(logical))));
        }
        self.primary_key = key;
        self.index = Some(index);
        debug!(table = %self.name, key = ?names, rows = self.row_count(), "rebuilt primary key index");
        Ok(())
    }

    /// Returns a new empty table with the same name, columns and primary key.
    pub fn clone_schema(&self) -> Self {
        let mut table = Self::new(self.name.clone());
        table.columns = self.columns.clone();
        table.column_map = self.column_map.clone();
        table.store = ColumnStore::with_kinds(self.columns.iter().map(Column::storage_kind));
        table.deleted = table.store.clone();
        table.primary_key = self.primary_key.clone();
        table.index = self.index.as_ref().map(|_| PrimaryKeyIndex::new());
        table
    }

    // ---- row access ----

    #[inline]
    fn physical(&self, logical: usize) -> usize {
        match &self.index {
            Some(index) => index.physical(logical),
            None => logical,
        }
    }

    fn keys(&self) -> KeyView<'_> {
        KeyView::new(&self.store, &self.primary_key)
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.row_count() {
            return Err(Error::row_not_found(&self.name, row));
        }
        Ok(())
    }

    fn to_record(&self, cells: StoredRow) -> Record {
        self.columns
            .iter()
            .zip(cells)
            .map(|(col, cell)| (col.name().to_string(), col.decode(cell)))
            .collect()
    }

    fn key_of(&self, values: &[Value]) -> Vec<Value> {
        self.primary_key.iter().map(|&c| values[c].clone()).collect()
    }

    /// Returns the primary-key tuple of a row.
    pub fn key_values(&self, row: usize) -> Option<Vec<Value>> {
        if row >= self.row_count() {
            return None;
        }
        Some(self.keys().key(self.physical(row)))
    }

    /// Returns a single value by row and column position.
    pub fn get_value(&self, row: usize, col: usize) -> Option<Value> {
        if row >= self.row_count() || col >= self.columns.len() {
            return None;
        }
        let cell = self.store.get(col, self.physical(row));
        Some(self.columns[col].decode(cell))
    }

    /// Returns all values of a row in column order.
    pub fn get_values(&self, row: usize) -> Option<Vec<Value>> {
        if row >= self.row_count() {
            return None;
        }
        let cells = self.store.get_row(self.physical(row));
        Some(
            self.columns
                .iter()
                .zip(cells)
                .map(|(col, cell)| col.decode(cell))
                .collect(),
        )
    }

    /// Returns a row as a record.
    pub fn get_row(&self, row: usize) -> Option<Record> {
        if row >= self.row_count() {
            return None;
        }
        Some(self.to_record(self.store.get_row(self.physical(row))))
    }

    /// Iterates over all rows in logical order.
    pub fn rows(&self) -> impl Iterator<Item = Record> + '_ {
        (0..self.row_count()).filter_map(move |row| self.get_row(row))
    }

    /// Returns a whole column in logical order.
    pub fn get_column_values(&self, col: usize) -> Option<Vec<Value>> {
        let column = self.columns.get(col)?;
        Some(
            (0..self.row_count())
                .map(|row| column.decode(self.store.get(col, self.physical(row))))
                .collect(),
        )
    }

    /// Returns the text form of a single value.
    pub fn get_string(&self, row: usize, col: usize) -> Option<String> {
        let value = self.get_value(row, col)?;
        Some(self.columns[col].text_encode(&value))
    }

    /// Returns the mutation state of a row.
    pub fn row_status(&self, row: usize) -> Option<RowStatus> {
        if row >= self.row_count() {
            return None;
        }
        Some(self.status[self.physical(row)])
    }

    /// Returns the row as it was at the last checkpoint: the current row if unchanged,
    /// the prior image if updated, `None` if inserted since.
    pub fn get_origin_row(&self, row: usize) -> Option<Record> {
        if row >= self.row_count() {
            return None;
        }
        let physical = self.physical(row);
        match self.status[physical] {
            RowStatus::Unchanged => Some(self.to_record(self.store.get_row(physical))),
            RowStatus::Updated => self.origin[physical]
                .as_ref()
                .map(|image| self.to_record(image.clone())),
            RowStatus::Inserted => None,
        }
    }

    /// Returns a record holding every column's zero value.
    pub fn new_record(&self) -> Record {
        self.columns
            .iter()
            .map(|col| (col.name().to_string(), col.zero_value()))
            .collect()
    }

    // ---- lookup ----

    /// Returns the logical position of the row with exactly this key.
    pub fn find(&self, key: &[Value]) -> Option<usize> {
        let index = self.index.as_ref()?;
        index.find(&self.keys(), key).ok().flatten()
    }

    /// Returns the logical positions of rows whose key starts with `prefix`.
    pub fn search_range(&self, prefix: &[Value]) -> Range<usize> {
        match &self.index {
            Some(index) => index.prefix_range(&self.keys(), prefix).unwrap_or(0..0),
            None => 0..0,
        }
    }

    /// Returns rows whose key starts with `prefix`, in key order.
    pub fn search(&self, prefix: &[Value]) -> Vec<Record> {
        self.search_range(prefix)
            .filter_map(|row| self.get_row(row))
            .collect()
    }

    // ---- mutation ----

    fn encode_row(&self, values: Vec<Value>) -> Result<StoredRow> {
        if values.len() != self.columns.len() {
            return Err(Error::column_count_mismatch(self.columns.len(), values.len()));
        }
        self.columns
            .iter()
            .zip(values)
            .map(|(col, value)| col.encode(value))
            .collect()
    }

    fn record_values(&self, record: &Record) -> Vec<Value> {
        self.columns
            .iter()
            .map(|col| record.get(col.name()).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// Appends a row and returns its logical position.
    pub fn add_row(&mut self, values: Vec<Value>) -> Result<usize> {
        let key = self.key_of_checked(&values)?;
        let cells = self.encode_row(values)?;

        let target = match &self.index {
            Some(index) => {
                let keys = self.keys();
                if index.find(&keys, &key)?.is_some() {
                    return Err(Error::duplicate_key(&self.name, key));
                }
                Some(index.lower_bound(&keys, &key)?)
            }
            None => None,
        };

        let physical = self.store.append_row(cells)?;
        self.status.push(RowStatus::Inserted);
        self.origin.push(None);
        self.changed = true;

        let logical = match (self.index.as_mut(), target) {
            (Some(index), Some(target)) => {
                index.insert_at(target, physical);
                target
            }
            _ => physical,
        };
        trace!(table = %self.name, row = logical, "inserted row");
        Ok(logical)
    }

    /// Appends a row given by column name. Missing columns are `Null`.
    pub fn add_record(&mut self, record: &Record) -> Result<usize> {
        let values = self.record_values(record);
        self.add_row(values)
    }

    /// Overwrites a row and returns its logical position afterwards.
    ///
    /// Writing the values a row already holds is a no-op.
    pub fn set_values(&mut self, row: usize, values: Vec<Value>) -> Result<usize> {
        self.check_row(row)?;
        let new_key = self.key_of_checked(&values)?;
        let cells = self.encode_row(values)?;
        let physical = self.physical(row);
        let current = self.store.get_row(physical);
        if current == cells {
            return Ok(row);
        }

        let mut target = None;
        if let Some(index) = &self.index {
            let keys = self.keys();
            if keys.key(physical) != new_key {
                if index.find(&keys, &new_key)?.is_some() {
                    return Err(Error::duplicate_key(&self.name, new_key));
                }
                target = Some(index.lower_bound(&keys, &new_key)?);
            }
        }

        self.store.set_row(physical, cells)?;
        if self.status[physical] == RowStatus::Unchanged {
            self.status[physical] = RowStatus::Updated;
            self.origin[physical] = Some(current);
        }
        self.changed = true;

        let logical = match (self.index.as_mut(), target) {
            (Some(index), Some(target)) => index.move_entry(row, target),
            _ => row,
        };
        trace!(table = %self.name, row, moved_to = logical, "updated row");
        Ok(logical)
    }

    /// Overwrites a row given by column name. Missing columns are `Null`.
    pub fn update_row(&mut self, row: usize, record: &Record) -> Result<usize> {
        let values = self.record_values(record);
        self.set_values(row, values)
    }

    /// Deletes a row and records its prior image in the delete log.
    pub fn delete_row(&mut self, row: usize) -> Result<()> {
        self.check_row(row)?;
        let physical = self.physical(row);
        let image = match self.status[physical] {
            RowStatus::Updated => match &self.origin[physical] {
                Some(image) => image.clone(),
                None => self.store.get_row(physical),
            },
            RowStatus::Unchanged | RowStatus::Inserted => self.store.get_row(physical),
        };
        self.deleted.append_row(image)?;

        let last = self.row_count() - 1;
        self.store.remove_row(physical);
        self.status.swap_remove(physical);
        self.origin.swap_remove(physical);
        if let Some(index) = self.index.as_mut() {
            index.remove(row, last);
        }
        self.changed = true;
        trace!(table = %self.name, row, "deleted row");
        Ok(())
    }

    /// Deletes every row, logging each one.
    pub fn delete_all(&mut self) -> Result<()> {
        while !self.is_empty() {
            self.delete_row(self.row_count() - 1)?;
        }
        Ok(())
    }

    /// Drops all rows and pending changes without logging them. Keeps columns and key.
    pub fn clear(&mut self) {
        self.store.clear();
        self.deleted.clear();
        self.status.clear();
        self.origin.clear();
        if let Some(index) = self.index.as_mut() {
            index.clear();
        }
        self.changed = false;
        debug!(table = %self.name, "cleared table");
    }

    // ---- change tracking ----

    /// Returns true after any mutation since the last checkpoint or clear.
    pub fn has_change(&self) -> bool {
        self.changed
    }

    /// Returns the pending changes. Inserted and updated rows come in key order.
    pub fn get_change(&self) -> TableChange {
        let mut inserted = Vec::new();
        let mut updated = Vec::new();
        for row in 0..self.row_count() {
            let physical = self.physical(row);
            match self.status[physical] {
                RowStatus::Unchanged => {}
                RowStatus::Inserted => inserted.push(self.to_record(self.store.get_row(physical))),
                RowStatus::Updated => {
                    let current = self.to_record(self.store.get_row(physical));
                    let origin = match &self.origin[physical] {
                        Some(image) => self.to_record(image.clone()),
                        None => current.clone(),
                    };
                    updated.push(UpdatedRow { current, origin });
                }
            }
        }
        let deleted = (0..self.deleted.len())
            .map(|pos| self.to_record(self.deleted.get_row(pos)))
            .collect();
        TableChange::new(inserted, updated, deleted)
    }

    /// Checkpoint: marks every row unchanged and drops origin images and the delete log.
    pub fn accept_change(&mut self) {
        let change_count = self.status.iter().filter(|s| **s != RowStatus::Unchanged).count()
            + self.deleted.len();
        self.status.fill(RowStatus::Unchanged);
        self.origin.fill(None);
        self.deleted.clear();
        self.changed = false;
        debug!(table = %self.name, changes = change_count, "accepted changes");
    }

    /// Appends every row of `other`, with its pending changes.
    ///
    /// The two tables must have the same column kinds. Their key spaces are expected
    /// to be disjoint; colliding keys are not detected.
    pub fn merge(&mut self, other: &Table) -> Result<()> {
        self.store.check_compatible(&other.store)?;
        let offset = self.row_count();
        let run: Option<Vec<usize>> = match &self.index {
            None => None,
            Some(_) => {
                let order = match &other.index {
                    Some(index) if other.primary_key == self.primary_key => index.clone(),
                    _ => PrimaryKeyIndex::build(&KeyView::new(&other.store, &self.primary_key))?,
                };
                Some(order.positions().iter().map(|p| p + offset).collect())
            }
        };

        self.store.merge(&other.store)?;
        self.deleted.merge(&other.deleted)?;
        self.status.extend_from_slice(&other.status);
        self.origin.extend_from_slice(&other.origin);
        self.changed |= other.changed;

        if let (Some(index), Some(run)) = (self.index.as_mut(), run) {
            index.merge_run(&KeyView::new(&self.store, &self.primary_key), &run)?;
        }
        debug!(
            table = %self.name,
            from = %other.name,
            rows = other.row_count(),
            deleted = other.deleted.len(),
            "merged table"
        );
        Ok(())
    }

    fn key_of_checked(&self, values: &[Value]) -> Result<Vec<Value>> {
        if values.len() != self.columns.len() {
            return Err(Error::column_count_mismatch(self.columns.len(), values.len()));
        }
        Ok(self.key_of(values))
    }
}

/// Builder for creating tables.
///
/// ```rust
/// use tabula_core::schema::Column;
/// use tabula_core::Value;
/// use tabula_storage::TableBuilder;
///
/// let mut table = TableBuilder::new("users")
///     .column(Column::int64("id"))
///     .unwrap()
///     .column(Column::string("name").nullable(true))
///     .unwrap()
///     .primary_key(&["id"])
///     .unwrap()
///     .build();
///
/// table.add_row(vec![Value::Int64(2), Value::from("bob")]).unwrap();
/// table.add_row(vec![Value::Int64(1), Value::Null]).unwrap();
/// assert_eq!(table.find(&[Value::Int64(2)]), Some(1));
/// ```
#[derive(Debug)]
pub struct TableBuilder {
    table: Table,
}

impl TableBuilder {
    /// Creates a new table builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: Table::new(name),
        }
    }

    /// Adds a column to the table.
    pub fn column(mut self, column: Column) -> Result<Self> {
        self.table.add_column(column)?;
        Ok(self)
    }

    /// Adds several columns in order.
    pub fn columns(mut self, columns: impl IntoIterator<Item = Column>) -> Result<Self> {
        for column in columns {
            self.table.add_column(column)?;
        }
        Ok(self)
    }

    /// Sets the primary key.
    pub fn primary_key(mut self, names: &[&str]) -> Result<Self> {
        self.table.set_primary_key(names)?;
        Ok(self)
    }

    /// Builds the table.
    pub fn build(self) -> Table {
        self.table
    }
}
