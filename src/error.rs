//! Error definitions.

use std::collections::TryReserveError;
use thiserror::Error;

/// Everything a table operation can fail with.
///
/// A missing key is not an error: lookups return `Option` and removing an
/// absent key does nothing. Every variant here leaves the table exactly as
/// it was before the failing call.
#[derive(Error, Debug)]
pub enum TableError {
    /// The slot array (or the rebuild plan) could not be allocated.
    #[error("failed to allocate storage for {capacity} slots")]
    Alloc {
        capacity: usize,
        #[source]
        source: TryReserveError,
    },

    /// Quadratic probing reached no free slot in a table of this capacity.
    #[error("no free slot reachable by probing a table of capacity {capacity}")]
    ProbeExhausted { capacity: usize },

    /// The cursor was produced before the table's storage was rebuilt.
    #[error("cursor from epoch {cursor} used after the table was rebuilt (now epoch {table})")]
    StaleCursor { cursor: u64, table: u64 },

    /// The cursor's slot no longer holds an element.
    #[error("cursor points at slot {index}, which holds no element")]
    VacantSlot { index: usize },
}
