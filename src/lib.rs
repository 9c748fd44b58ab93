//! unified-hash: one open-addressing hash table engine serving two
//! personalities, an integer-keyed map (`IntHash`) and a string-keyed map
//! (`Dict`).
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a single, self-contained hash table whose invariants are small
//!   enough to check by hand: probe termination, tombstone accounting and
//!   prime capacities.
//! - Layers:
//!   - `hashing`: the sealed `Key` trait. Integer keys mix through the
//!     MurmurHash3 finalizer, byte-string keys through djb2. Both avoid
//!     the two tag values reserved for free slots and tombstones.
//!   - `slot`: `Slot<K, V>` (Free | Deleted | Occupied) in one flat `Vec`,
//!     fallible allocation, and the quadratic probe sequence.
//!   - `hash_table`: `HashTable<K, V>`; get/put/remove, load-factor
//!     driven rebuilds, cursors.
//!   - `cursor`: `Cursor` (slot index + epoch) and borrowing iterators.
//!
//! Constraints
//! - Single-threaded: no interior mutability, no locking. Callers that
//!   share a table must serialize access themselves.
//! - Keys are signed integers or byte strings. `IntHash`, `Dict` and
//!   `ByteDict` are aliases of one generic type, not separate
//!   implementations.
//! - Value size is `size_of::<V>()`, fixed for the life of the table.
//!
//! Probing and tombstones
//! - A search starts at `hash % capacity` and advances by 1, 4, 9, ...
//!   It stops at the first free slot, since insertion never skips one.
//!   Tombstones keep chains intact; the first tombstone seen is the slot
//!   an insert claims.
//! - A search visits at most `capacity` positions. If neither a free slot
//!   nor a tombstone is reachable, `put` grows the table and retries
//!   instead of looping.
//!
//! Resizing
//! - Before an insert that would push `len` above 3/4 of capacity, the
//!   table grows to `snap_to_prime(2 * capacity)`. After a removal that
//!   leaves `len` below 1/5, it shrinks to `snap_to_prime(capacity / 2)`
//!   if that is smaller than the current capacity. Neither ever goes
//!   below `len`.
//! - When tombstones plus elements would pass 3/4 but elements alone would
//!   not, the table is rebuilt at `snap_to_prime(capacity)`, which is the
//!   same capacity unless the caller picked a non-prime one.
//! - A rebuild plans every destination from the stored hashes (keys are
//!   never rehashed) before moving anything, so a failed allocation or an
//!   unplaceable element leaves the table untouched.
//!
//! Cursors
//! - A `Cursor` is a slot index plus the table's epoch. Every rebuild bumps
//!   the epoch; accessors reject cursors from an older one.
//! - `remove_at` tombstones in place and never resizes, so iterating with
//!   `start`/`next` while removing the current element is safe.
//!
//! Notes and non-goals
//! - Iteration order is raw slot order.
//! - No persistence, no custom hashers, no tunable load factors.
//! - With the `logging` feature (on by default) rebuilds and failed
//!   automatic resizes are reported through the `log` facade.

#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        ::log::debug!($($arg)*)
    };
}

#[cfg(feature = "logging")]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        ::log::trace!($($arg)*)
    };
}

#[cfg(feature = "logging")]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        ::log::warn!($($arg)*)
    };
}

// Without the feature the arguments are still type-checked, never formatted.
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if false {
            let _ = format!($($arg)*);
        }
    };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        if false {
            let _ = format!($($arg)*);
        }
    };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if false {
            let _ = format!($($arg)*);
        }
    };
}

pub mod cursor;
pub mod error;
pub mod hash_table;
mod hash_table_proptest;
pub mod hashing;
pub mod primes;
mod slot;

// Public surface
pub use cursor::Cursor;
pub use error::TableError;
pub use hash_table::{ByteDict, Dict, HashTable, IntHash};
pub use hashing::{Discipline, Key};
pub use primes::snap_to_prime;
