//! Change tracking types for Tabula tables.
//!
//! A table tags every physical row with a [`RowStatus`] and keeps prior images of
//! updated and deleted rows until the next checkpoint. [`TableChange`] is the
//! diff a caller reads to reconcile an external store.

use std::collections::BTreeMap;

use tabula_core::Value;

/// A row as a name -> value map, ordered by column name.
pub type Record = BTreeMap<String, Value>;

/// Mutation state of a physical row since the last checkpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RowStatus {
    /// Present at the last checkpoint and not modified since.
    #[default]
    Unchanged,
    /// Present at the last checkpoint and modified since; its prior image is kept.
    Updated,
    /// Added since the last checkpoint. Stays `Inserted` through later updates.
    Inserted,
}

/// An updated row with its image at the last checkpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdatedRow {
    pub current: Record,
    pub origin: Record,
}

/// Pending changes of a table since its last checkpoint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableChange {
    /// Rows added since the checkpoint, in key order.
    pub inserted: Vec<Record>,
    /// Rows modified since the checkpoint, in key order.
    pub updated: Vec<UpdatedRow>,
    /// Prior images of rows deleted since the checkpoint, in deletion order.
    pub deleted: Vec<Record>,
    /// Total number of changed rows.
    pub row_count: usize,
}

impl TableChange {
    /// Creates a change set and computes its row count.
    pub fn new(inserted: Vec<Record>, updated: Vec<UpdatedRow>, deleted: Vec<Record>) -> Self {
        let row_count = inserted.len() + updated.len() + deleted.len();
        Self {
            inserted,
            updated,
            deleted,
            row_count,
        }
    }

    /// Returns true if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Converts to `(before, after)` pairs: inserts have no before image,
    /// deletes have no after image.
    pub fn as_modifications(&self) -> Vec<(Option<&Record>, Option<&Record>)> {
        let mut mods = Vec::with_capacity(self.row_count);

        for row in &self.inserted {
            mods.push((None, Some(row)));
        }

        for row in &self.updated {
            mods.push((Some(&row.origin), Some(&row.current)));
        }

        for row in &self.deleted {
            mods.push((Some(row), None));
        }

        mods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> Record {
        let mut r = Record::new();
        r.insert("id".into(), Value::Int64(id));
        r
    }

    #[test]
    fn test_row_status_default() {
        assert_eq!(RowStatus::default(), RowStatus::Unchanged);
    }

    #[test]
    fn test_table_change_counts() {
        let change = TableChange::new(
            vec![record(1)],
            vec![UpdatedRow {
                current: record(2),
                origin: record(3),
            }],
            vec![record(4), record(5)],
        );
        assert_eq!(change.row_count, 4);
        assert!(!change.is_empty());
        assert!(TableChange::default().is_empty());
    }

    #[test]
    fn test_as_modifications() {
        let inserted = record(1);
        let change = TableChange::new(
            vec![inserted.clone()],
            vec![UpdatedRow {
                current: record(2),
                origin: record(3),
            }],
            vec![record(4)],
        );
        let mods = change.as_modifications();
        assert_eq!(mods.len(), 3);
        assert_eq!(mods[0], (None, Some(&inserted)));
        assert_eq!(mods[1].0.and_then(|r| r.get("id")), Some(&Value::Int64(3)));
        assert!(mods[2].1.is_none());
    }
}
