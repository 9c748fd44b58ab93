//! HashTable: open-addressing engine shared by the integer-keyed and
//! string-keyed personalities.

use crate::cursor::{occupied_from, Cursor, IntoIter, Iter, IterMut};
use crate::error::TableError;
use crate::hashing::{Discipline, Key, DELETED, FREE};
use crate::primes::snap_to_prime;
use crate::slot::{alloc_slots, vacant_index, ProbeSeq, Slot};
use core::borrow::Borrow;
use core::fmt;

/// Integer-keyed personality ("Hash").
pub type IntHash<V> = HashTable<i64, V>;
/// String-keyed personality ("Dict").
pub type Dict<V> = HashTable<String, V>;
/// Byte-string-keyed variant of `Dict`.
pub type ByteDict<V> = HashTable<Vec<u8>, V>;

/// Outcome of probing for a key.
enum Probe {
    Found(usize),
    /// Not present; the slot to claim if inserting. A tombstone seen
    /// earlier on the sequence wins over the free slot that ended it.
    Vacant(usize),
    /// Not present, and no free slot or tombstone is reachable.
    Exhausted,
}

/// Where `put` will write once it has made room.
enum Place {
    Found(usize),
    Vacant(usize),
}

// Load-factor policy: grow when an insert would pass 3/4, shrink when a
// removal drops below 1/5.
#[inline]
fn above_max_load(count: usize, capacity: usize) -> bool {
    count.saturating_mul(4) > capacity.saturating_mul(3)
}

#[inline]
fn below_min_load(count: usize, capacity: usize) -> bool {
    count.saturating_mul(5) < capacity
}

/// Open-addressing hash table with quadratic probing, tombstone deletion
/// and prime capacities.
///
/// Not thread-safe by contract: every operation takes `&self` or
/// `&mut self` and runs to completion. Any rebuild of the storage
/// (growth, shrink, tombstone purge, explicit `resize`) bumps the epoch
/// and invalidates outstanding cursors.
pub struct HashTable<K, V> {
    slots: Vec<Slot<K, V>>,
    len: usize,
    deleted: usize,
    epoch: u64,
}

impl<K: Key, V> HashTable<K, V> {
    /// An empty table with no storage. The first `put` allocates.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
            deleted: 0,
            epoch: 0,
        }
    }

    /// A table with exactly `capacity` free slots. The capacity is taken
    /// as given; only the table's own resizes snap to primes.
    pub fn with_capacity(capacity: usize) -> Result<Self, TableError> {
        Ok(Self {
            slots: alloc_slots(capacity)?,
            len: 0,
            deleted: 0,
            epoch: 0,
        })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Bytes per stored value.
    pub fn value_size(&self) -> usize {
        core::mem::size_of::<V>()
    }

    pub fn discipline(&self) -> Discipline {
        K::DISCIPLINE
    }

    fn search<Q>(&self, key: &Q, hash: u64) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized + Key,
    {
        let mut first_deleted = None;
        for index in ProbeSeq::new(hash, self.slots.len()) {
            match &self.slots[index] {
                Slot::Free => return Probe::Vacant(first_deleted.unwrap_or(index)),
                Slot::Deleted => {
                    first_deleted.get_or_insert(index);
                }
                Slot::Occupied { hash: h, key: k, .. } => {
                    if *h == hash && <K as Borrow<Q>>::borrow(k) == key {
                        return Probe::Found(index);
                    }
                }
            }
        }
        match first_deleted {
            Some(index) => Probe::Vacant(index),
            None => Probe::Exhausted,
        }
    }

    fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Key,
    {
        match self.search(key, key.key_hash()) {
            Probe::Found(index) => Some(index),
            _ => None,
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Key,
    {
        let index = self.find(key)?;
        self.slots[index].value()
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Key,
    {
        let index = self.find(key)?;
        self.slots[index].value_mut()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Key,
    {
        self.find(key).is_some()
    }

    /// Insert or overwrite. Returns the previous value for `key`, if any.
    ///
    /// Fails only when no slot can be made available: the table needed to
    /// grow, the allocation failed, and the current storage has no room
    /// left on the key's probe sequence. The table is unchanged then.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        let hash = key.key_hash();
        match self.place(&key, hash)? {
            Place::Found(index) => {
                let slot = self.slots[index]
                    .value_mut()
                    .expect("probe matched an occupied slot");
                Ok(Some(core::mem::replace(slot, value)))
            }
            Place::Vacant(index) => {
                self.occupy(index, hash, key, value);
                Ok(None)
            }
        }
    }

    /// Reference to the value stored under `key`, inserting `default()`
    /// first if the key is absent. `default` runs only on insertion.
    pub fn put_with<F>(&mut self, key: K, default: F) -> Result<&mut V, TableError>
    where
        F: FnOnce() -> V,
    {
        let hash = key.key_hash();
        let index = match self.place(&key, hash)? {
            Place::Found(index) => index,
            Place::Vacant(index) => {
                self.occupy(index, hash, key, default());
                index
            }
        };
        Ok(self.slots[index]
            .value_mut()
            .expect("slot was just found or filled"))
    }

    /// Make room for one more element if needed, then locate `key`.
    fn place(&mut self, key: &K, hash: u64) -> Result<Place, TableError> {
        let capacity = self.capacity();
        if above_max_load(self.len + 1, capacity) {
            // On failure keep going with the current storage; the probe
            // below decides whether there is still room.
            if let Err(err) = self.grow() {
                log_warn!("growing from capacity {} failed: {}", capacity, err);
            }
        } else if above_max_load(self.len + self.deleted + 1, capacity) {
            // A caller-chosen capacity may not be prime; the purge fixes that.
            let target = snap_to_prime(capacity);
            log_trace!(
                "purging {} tombstones at capacity {} -> {}",
                self.deleted,
                capacity,
                target
            );
            if let Err(err) = self.rehash(target) {
                log_warn!("purging tombstones at capacity {} failed: {}", capacity, err);
            }
        }

        loop {
            match self.search(key, hash) {
                Probe::Found(index) => return Ok(Place::Found(index)),
                Probe::Vacant(index) => return Ok(Place::Vacant(index)),
                Probe::Exhausted => self.grow()?,
            }
        }
    }

    fn occupy(&mut self, index: usize, hash: u64, key: K, value: V) {
        let slot = &mut self.slots[index];
        // Stored hashes never collide with the vacant tags.
        debug_assert!(matches!(slot.tag(), FREE | DELETED));
        if matches!(slot, Slot::Deleted) {
            self.deleted -= 1;
        }
        *slot = Slot::Occupied { hash, key, value };
        self.len += 1;
    }

    fn tombstone(&mut self, index: usize) -> Option<(K, V)> {
        let entry = self.slots[index].take()?;
        self.len -= 1;
        self.deleted += 1;
        Some(entry)
    }

    /// Remove `key`, returning its value. Shrinks the table when it falls
    /// below the minimum load.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Key,
    {
        let index = self.find(key)?;
        let (_, value) = self.tombstone(index)?;

        let capacity = self.capacity();
        if below_min_load(self.len, capacity) {
            let target = snap_to_prime(capacity / 2);
            // Halving can snap back up to the current size; nothing to do then.
            if target >= capacity {
                return Some(value);
            }
            log_trace!("shrinking: len {} below 1/5 of {}", self.len, capacity);
            if let Err(err) = self.resize_to(target) {
                log_warn!("shrinking from capacity {} failed: {}", capacity, err);
            }
        }
        Some(value)
    }

    /// Rebuild the storage with `capacity` slots, snapped up to a prime.
    ///
    /// A no-op if the snapped capacity is smaller than `len`. On error the
    /// table is left untouched.
    pub fn resize(&mut self, capacity: usize) -> Result<(), TableError> {
        self.resize_to(snap_to_prime(capacity))
    }

    fn resize_to(&mut self, capacity: usize) -> Result<(), TableError> {
        if capacity < self.len {
            log_debug!(
                "ignoring resize to {} below len {}",
                capacity,
                self.len
            );
            return Ok(());
        }
        self.rehash(capacity)
    }

    /// Grow to the next prime at or above twice the capacity, doubling
    /// again if probing cannot place every element at that size.
    fn grow(&mut self) -> Result<(), TableError> {
        let mut target = snap_to_prime(self.capacity().saturating_mul(2));
        loop {
            match self.rehash(target) {
                Err(TableError::ProbeExhausted { .. }) if target < usize::MAX => {
                    target = snap_to_prime(target.saturating_mul(2));
                }
                result => return result,
            }
        }
    }

    /// Move every element into fresh storage of exactly `capacity` slots,
    /// dropping tombstones.
    ///
    /// Destinations are planned from the stored hashes before anything
    /// moves, so a failed allocation or an unplaceable element leaves the
    /// table as it was.
    fn rehash(&mut self, capacity: usize) -> Result<(), TableError> {
        let mut fresh = alloc_slots::<K, V>(capacity)?;
        let mut plan: Vec<usize> = Vec::new();
        plan.try_reserve_exact(self.len)
            .map_err(|source| TableError::Alloc {
                capacity: self.len,
                source,
            })?;

        for slot in &self.slots {
            if let Slot::Occupied { hash, .. } = slot {
                let index =
                    vacant_index(&fresh, *hash).ok_or(TableError::ProbeExhausted { capacity })?;
                // Reserve the destination until the move below.
                fresh[index] = Slot::Deleted;
                plan.push(index);
            }
        }

        log_debug!(
            "rehash: capacity {} -> {}, len {}, dropping {} tombstones",
            self.capacity(),
            capacity,
            self.len,
            self.deleted
        );

        let old = core::mem::replace(&mut self.slots, fresh);
        for (slot, index) in old.into_iter().filter(Slot::is_occupied).zip(plan) {
            self.slots[index] = slot;
        }
        self.deleted = 0;
        self.epoch = self.epoch.wrapping_add(1);
        Ok(())
    }

    /// Cursor at the first element in slot order, if any.
    pub fn start(&self) -> Option<Cursor> {
        occupied_from(&self.slots, 0).map(|index| Cursor::new(index, self.epoch))
    }

    /// Cursor at the next element after `cursor` in slot order.
    ///
    /// Works after `remove_at(cursor)`; fails if the table was rebuilt
    /// since `cursor` was produced.
    pub fn next(&self, cursor: Cursor) -> Result<Option<Cursor>, TableError> {
        cursor.check(self.epoch)?;
        Ok(occupied_from(&self.slots, cursor.index + 1)
            .map(|index| Cursor::new(index, self.epoch)))
    }

    fn slot_at(&self, cursor: Cursor) -> Option<&Slot<K, V>> {
        cursor.check(self.epoch).ok()?;
        self.slots.get(cursor.index)
    }

    /// Key under `cursor`; `None` if the cursor is stale or its element
    /// was removed.
    pub fn key_at(&self, cursor: Cursor) -> Option<&K> {
        self.slot_at(cursor)?.key()
    }

    pub fn value_at(&self, cursor: Cursor) -> Option<&V> {
        self.slot_at(cursor)?.value()
    }

    pub fn value_at_mut(&mut self, cursor: Cursor) -> Option<&mut V> {
        cursor.check(self.epoch).ok()?;
        self.slots.get_mut(cursor.index)?.value_mut()
    }

    /// Remove the element under `cursor`. Never resizes, so the cursor
    /// stays usable with `next`.
    pub fn remove_at(&mut self, cursor: Cursor) -> Result<(K, V), TableError> {
        cursor.check(self.epoch)?;
        if cursor.index >= self.slots.len() {
            return Err(TableError::VacantSlot {
                index: cursor.index,
            });
        }
        self.tombstone(cursor.index).ok_or(TableError::VacantSlot {
            index: cursor.index,
        })
    }

    /// Keep only the elements for which `f` returns true. Removal
    /// tombstones in place; the capacity does not change.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        for index in 0..self.slots.len() {
            let keep = match &mut self.slots[index] {
                Slot::Occupied { key, value, .. } => f(&*key, value),
                _ => true,
            };
            if !keep {
                drop(self.tombstone(index));
            }
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.slots.iter(),
            remaining: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.slots.iter_mut(),
            remaining: self.len,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    #[cfg(test)]
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    #[cfg(test)]
    pub(crate) fn tombstones(&self) -> usize {
        self.deleted
    }
}

impl<K: Key, V> Default for HashTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key + fmt::Debug, V: fmt::Debug> fmt::Debug for HashTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K: Key, V> IntoIterator for &'a HashTable<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K: Key, V> IntoIterator for &'a mut HashTable<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K: Key, V> IntoIterator for HashTable<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            it: self.slots.into_iter(),
            remaining: self.len,
        }
    }
}
