//! Cursors and borrowing iterators over slot memory.
//!
//! Both walk the slot array in raw index order, skipping free slots and
//! tombstones. The order has nothing to do with insertion or key order.

use crate::error::TableError;
use crate::hash_table::HashTable;
use crate::hashing::Key;
use crate::slot::Slot;

/// Position of an element in a table's slot array, stamped with the
/// table's epoch at the time it was produced.
///
/// A cursor survives `remove_at` (which tombstones in place) but not a
/// rebuild of the storage: after any resize every accessor rejects it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Cursor {
    pub(crate) index: usize,
    pub(crate) epoch: u64,
}

impl Cursor {
    pub(crate) fn new(index: usize, epoch: u64) -> Self {
        Cursor { index, epoch }
    }

    /// Slot index this cursor points at.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn key<'a, K: Key, V>(&self, table: &'a HashTable<K, V>) -> Option<&'a K> {
        table.key_at(*self)
    }

    pub fn value<'a, K: Key, V>(&self, table: &'a HashTable<K, V>) -> Option<&'a V> {
        table.value_at(*self)
    }

    pub fn value_mut<'a, K: Key, V>(&self, table: &'a mut HashTable<K, V>) -> Option<&'a mut V> {
        table.value_at_mut(*self)
    }

    /// Error unless this cursor was produced since the last rebuild.
    pub(crate) fn check(&self, epoch: u64) -> Result<(), TableError> {
        if self.epoch == epoch {
            Ok(())
        } else {
            Err(TableError::StaleCursor {
                cursor: self.epoch,
                table: epoch,
            })
        }
    }
}

/// Index of the first occupied slot at or after `from`.
pub(crate) fn occupied_from<K, V>(slots: &[Slot<K, V>], from: usize) -> Option<usize> {
    slots
        .get(from..)?
        .iter()
        .position(Slot::is_occupied)
        .map(|offset| from + offset)
}

/// Iterator over shared entries of a `HashTable`.
pub struct Iter<'a, K, V> {
    pub(crate) it: core::slice::Iter<'a, Slot<K, V>>,
    pub(crate) remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.it.by_ref() {
            if let Slot::Occupied { key, value, .. } = slot {
                self.remaining -= 1;
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over entries of a `HashTable` with mutable values.
pub struct IterMut<'a, K, V> {
    pub(crate) it: core::slice::IterMut<'a, Slot<K, V>>,
    pub(crate) remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.it.by_ref() {
            if let Slot::Occupied { key, value, .. } = slot {
                self.remaining -= 1;
                return Some((&*key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// Owning iterator, consuming the table.
pub struct IntoIter<K, V> {
    pub(crate) it: std::vec::IntoIter<Slot<K, V>>,
    pub(crate) remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.it.by_ref() {
            if let Slot::Occupied { key, value, .. } = slot {
                self.remaining -= 1;
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
