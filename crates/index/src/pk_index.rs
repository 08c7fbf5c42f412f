//! Sorted primary-key index over physical row positions.
//!
//! The index is a permutation of physical positions in ascending key order.
//! Keys are never copied into the index; they are read through a [`KeySource`]
//! so the owning table stays the single home of row data.

use crate::comparator::compare_keys;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::ops::Range;
use tabula_core::{Error, Result, Value};

/// Provides key tuples by physical position.
///
/// Only `row_count` and `key` are required. Sources that can compare stored keys
/// in place should override the `compare_*` methods, which the index uses for
/// every search and merge step.
pub trait KeySource {
    /// Number of physical rows.
    fn row_count(&self) -> usize;

    /// Returns the key tuple stored at a physical position.
    fn key(&self, physical: usize) -> Vec<Value>;

    /// Compares the stored key at `physical` with `key`, as [`compare_keys`] does.
    fn compare_key(&self, physical: usize, key: &[Value]) -> Result<Ordering> {
        compare_keys(&self.key(physical), key)
    }

    /// Compares the first `prefix.len()` components of the stored key with `prefix`.
    fn compare_head(&self, physical: usize, prefix: &[Value]) -> Result<Ordering> {
        let key = self.key(physical);
        compare_keys(&key[..prefix.len().min(key.len())], prefix)
    }

    /// Compares the stored keys at two physical positions.
    fn compare_positions(&self, a: usize, b: usize) -> Result<Ordering> {
        self.compare_key(a, &self.key(b))
    }
}

impl KeySource for [Vec<Value>] {
    fn row_count(&self) -> usize {
        self.len()
    }

    fn key(&self, physical: usize) -> Vec<Value> {
        self[physical].clone()
    }

    fn compare_key(&self, physical: usize, key: &[Value]) -> Result<Ordering> {
        compare_keys(&self[physical], key)
    }

    fn compare_head(&self, physical: usize, prefix: &[Value]) -> Result<Ordering> {
        let key = &self[physical];
        compare_keys(&key[..prefix.len().min(key.len())], prefix)
    }

    fn compare_positions(&self, a: usize, b: usize) -> Result<Ordering> {
        compare_keys(&self[a], &self[b])
    }
}

impl KeySource for Vec<Vec<Value>> {
    fn row_count(&self) -> usize {
        self.len()
    }

    fn key(&self, physical: usize) -> Vec<Value> {
        self[physical].clone()
    }

    fn compare_key(&self, physical: usize, key: &[Value]) -> Result<Ordering> {
        self.as_slice().compare_key(physical, key)
    }

    fn compare_head(&self, physical: usize, prefix: &[Value]) -> Result<Ordering> {
        self.as_slice().compare_head(physical, prefix)
    }

    fn compare_positions(&self, a: usize, b: usize) -> Result<Ordering> {
        self.as_slice().compare_positions(a, b)
    }
}

/// Primary-key index: logical position -> physical position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrimaryKeyIndex {
    positions: Vec<usize>,
}

impl PrimaryKeyIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index over every row of `source`.
    pub fn build<S: KeySource + ?Sized>(source: &S) -> Result<Self> {
        let mut index = Self::new();
        index.rebuild(source)?;
        Ok(index)
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the index has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns the physical position at a logical position.
    #[inline]
    pub fn physical(&self, logical: usize) -> usize {
        self.positions[logical]
    }

    /// Returns the logical position holding a physical position, if any.
    pub fn logical(&self, physical: usize) -> Option<usize> {
        self.positions.iter().position(|&p| p == physical)
    }

    /// Returns the physical positions in key order.
    #[inline]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Re-sorts all rows of `source` by key.
    ///
    /// Fails with `KindMismatch` if two rows hold non-null values of different kinds
    /// in the same key component; the index is left untouched in that case.
    pub fn rebuild<S: KeySource + ?Sized>(&mut self, source: &S) -> Result<()> {
        let keys: Vec<Vec<Value>> = (0..source.row_count()).map(|p| source.key(p)).collect();
        check_kinds(&keys)?;

        let mut positions: Vec<usize> = (0..keys.len()).collect();
        // Kinds agree per component, so every comparison succeeds.
        positions.sort_by(|&a, &b| compare_keys(&keys[a], &keys[b]).unwrap_or(Ordering::Equal));
        self.positions = positions;
        Ok(())
    }

    /// Returns the smallest logical position whose key is `>= key`.
    ///
    /// A key prefix yields the first row starting with that prefix.
    pub fn lower_bound<S: KeySource + ?Sized>(&self, source: &S, key: &[Value]) -> Result<usize> {
        let (mut lo, mut hi) = (0, self.positions.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if source.compare_key(self.positions[mid], key)? == Ordering::Less {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Ok(lo)
    }

    /// Returns the logical range of rows whose key starts with `prefix`.
    pub fn prefix_range<S: KeySource + ?Sized>(
        &self,
        source: &S,
        prefix: &[Value],
    ) -> Result<Range<usize>> {
        let start = self.lower_bound(source, prefix)?;
        let (mut lo, mut hi) = (start, self.positions.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if source.compare_head(self.positions[mid], prefix)? == Ordering::Greater {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        Ok(start..lo)
    }

    /// Returns the logical position of the row whose key equals `key`.
    pub fn find<S: KeySource + ?Sized>(&self, source: &S, key: &[Value]) -> Result<Option<usize>> {
        let pos = self.lower_bound(source, key)?;
        if pos < self.positions.len()
            && source.compare_key(self.positions[pos], key)? == Ordering::Equal
        {
            return Ok(Some(pos));
        }
        Ok(None)
    }

    /// Returns the first logical position whose key equals the next entry's key.
    pub fn first_duplicate<S: KeySource + ?Sized>(&self, source: &S) -> Result<Option<usize>> {
        for (logical, pair) in self.positions.windows(2).enumerate() {
            if source.compare_positions(pair[0], pair[1])? == Ordering::Equal {
                return Ok(Some(logical));
            }
        }
        Ok(None)
    }

    /// Inserts a physical position at a logical position.
    pub fn insert_at(&mut self, logical: usize, physical: usize) {
        self.positions.insert(logical, physical);
    }

    /// Removes the entry at `logical` after its row was swap-removed.
    ///
    /// `displaced` is the old last physical slot, whose row now sits in the vacated slot.
    pub fn remove(&mut self, logical: usize, displaced: usize) {
        let vacated = self.positions.remove(logical);
        if vacated == displaced {
            return;
        }
        if let Some(entry) = self.positions.iter_mut().find(|p| **p == displaced) {
            *entry = vacated;
        }
    }

    /// Moves the entry at `old` so the row lands at lower bound `new`.
    ///
    /// `new` must be computed for the row's new key while the row still sits at `old`
    /// with its old key. Returns the final logical position.
    pub fn move_entry(&mut self, old: usize, new: usize) -> usize {
        if new > old {
            self.positions[old..new].rotate_left(1);
            new - 1
        } else {
            self.positions[new..=old].rotate_right(1);
            new
        }
    }

    /// Merges an ascending run of physical positions into the index.
    ///
    /// Entries with equal keys keep the receiver's entries first.
    pub fn merge_run<S: KeySource + ?Sized>(&mut self, source: &S, run: &[usize]) -> Result<()> {
        let mut merged = Vec::with_capacity(self.positions.len() + run.len());
        let (mut i, mut j) = (0, 0);
        while i < self.positions.len() && j < run.len() {
            if source.compare_positions(run[j], self.positions[i])? == Ordering::Less {
                merged.push(run[j]);
                j += 1;
            } else {
                merged.push(self.positions[i]);
                i += 1;
            }
        }
        merged.extend_from_slice(&self.positions[i..]);
        merged.extend_from_slice(&run[j..]);
        self.positions = merged;
        Ok(())
    }
}

/// Checks that each key component holds a single non-null kind across all keys.
fn check_kinds(keys: &[Vec<Value>]) -> Result<()> {
    let width = keys.iter().map(Vec::len).max().unwrap_or(0);
    for c in 0..width {
        let mut kinds = keys.iter().filter_map(|k| k.get(c)).filter_map(Value::data_type);
        if let Some(first) = kinds.next() {
            if let Some(other) = kinds.find(|dt| *dt != first) {
                return Err(Error::kind_mismatch(first, other));
            }
        }
    }
    Ok(())
}
