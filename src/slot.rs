//! Slot storage and the probe sequence over it.

use crate::error::TableError;
use crate::hashing::{DELETED, FREE};

/// One cell of the table's flat slot array.
#[derive(Debug)]
pub(crate) enum Slot<K, V> {
    Free,
    Deleted,
    Occupied { hash: u64, key: K, value: V },
}

impl<K, V> Slot<K, V> {
    /// The tag the slot would carry in a flat layout: `FREE`, `DELETED`
    /// or the element's hash.
    #[inline]
    pub(crate) fn tag(&self) -> u64 {
        match self {
            Slot::Free => FREE,
            Slot::Deleted => DELETED,
            Slot::Occupied { hash, .. } => *hash,
        }
    }

    #[inline]
    pub(crate) fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    #[inline]
    pub(crate) fn key(&self) -> Option<&K> {
        match self {
            Slot::Occupied { key, .. } => Some(key),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn value(&self) -> Option<&V> {
        match self {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> Option<&mut V> {
        match self {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Turn an occupied slot into a tombstone, handing back its contents.
    /// Returns `None` and leaves the slot alone if it is not occupied.
    pub(crate) fn take(&mut self) -> Option<(K, V)> {
        if !self.is_occupied() {
            return None;
        }
        match core::mem::replace(self, Slot::Deleted) {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }
}

/// Allocate `capacity` free slots, reporting allocation failure instead of
/// aborting.
pub(crate) fn alloc_slots<K, V>(capacity: usize) -> Result<Vec<Slot<K, V>>, TableError> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|source| TableError::Alloc { capacity, source })?;
    slots.resize_with(capacity, || Slot::Free);
    Ok(slots)
}

/// Quadratic probe sequence: starts at `hash % capacity`, then the k-th
/// step advances by `k * k`. Yields at most `capacity` positions; in a
/// prime capacity the sequence repeats after that, so nothing further is
/// reachable.
pub(crate) struct ProbeSeq {
    index: usize,
    step: usize,
    capacity: usize,
}

impl ProbeSeq {
    pub(crate) fn new(hash: u64, capacity: usize) -> Self {
        let index = if capacity == 0 {
            0
        } else {
            (hash % capacity as u64) as usize
        };
        Self {
            index,
            step: 0,
            capacity,
        }
    }
}

impl Iterator for ProbeSeq {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.step >= self.capacity {
            return None;
        }
        if self.step > 0 {
            let square = (self.step as u128 * self.step as u128) % self.capacity as u128;
            self.index = (self.index + square as usize) % self.capacity;
        }
        self.step += 1;
        Some(self.index)
    }
}

/// First free slot on `hash`'s probe sequence. Used when rebuilding, where
/// keys are known to be distinct and no tombstones exist.
pub(crate) fn vacant_index<K, V>(slots: &[Slot<K, V>], hash: u64) -> Option<usize> {
    ProbeSeq::new(hash, slots.len()).find(|&i| matches!(slots[i], Slot::Free))
}
