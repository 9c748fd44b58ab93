//! Key disciplines and the two hash families.
//!
//! Slot tags share their value space with hashes: `FREE` (0) marks a slot
//! that was never used and `DELETED` (`u64::MAX`) marks a tombstone. Both
//! hash functions remap those two outputs to their neighbours, so `1` and
//! `u64::MAX - 1` come up twice as often as any other hash.
//!
//! String hashing reads bytes as unsigned: `0x80..=0xff` add 128..=255,
//! never a sign-extended negative value.

use std::fmt;

/// Tag of a slot that has never held an element since the last rebuild.
pub const FREE: u64 = 0;
/// Tag of a tombstone.
pub const DELETED: u64 = u64::MAX;

/// Which of the two personalities a key type belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Discipline {
    /// Signed integer keys.
    Numeric,
    /// Byte-string keys.
    String,
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discipline::Numeric => f.write_str("numeric"),
            Discipline::String => f.write_str("string"),
        }
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for i64 {}
    impl Sealed for str {}
    impl Sealed for String {}
    impl Sealed for Box<str> {}
    impl Sealed for [u8] {}
    impl Sealed for Vec<u8> {}
}

/// A key the table knows how to hash.
///
/// Sealed: only signed integers and byte strings are supported. Owned and
/// borrowed forms of the same discipline hash identically, so a
/// `HashTable<String, _>` can be queried with `&str`.
pub trait Key: sealed::Sealed + Eq {
    const DISCIPLINE: Discipline;

    /// Hash of this key; never `FREE` nor `DELETED`.
    fn key_hash(&self) -> u64;
}

impl Key for i64 {
    const DISCIPLINE: Discipline = Discipline::Numeric;

    #[inline]
    fn key_hash(&self) -> u64 {
        int_hash(*self)
    }
}

impl Key for str {
    const DISCIPLINE: Discipline = Discipline::String;

    #[inline]
    fn key_hash(&self) -> u64 {
        string_hash(self.as_bytes())
    }
}

impl Key for String {
    const DISCIPLINE: Discipline = Discipline::String;

    #[inline]
    fn key_hash(&self) -> u64 {
        string_hash(self.as_bytes())
    }
}

impl Key for Box<str> {
    const DISCIPLINE: Discipline = Discipline::String;

    #[inline]
    fn key_hash(&self) -> u64 {
        string_hash(self.as_bytes())
    }
}

impl Key for [u8] {
    const DISCIPLINE: Discipline = Discipline::String;

    #[inline]
    fn key_hash(&self) -> u64 {
        string_hash(self)
    }
}

impl Key for Vec<u8> {
    const DISCIPLINE: Discipline = Discipline::String;

    #[inline]
    fn key_hash(&self) -> u64 {
        string_hash(self)
    }
}

#[inline]
fn avoid_sentinels(h: u64) -> u64 {
    match h {
        FREE => 1,
        DELETED => DELETED - 1,
        h => h,
    }
}

/// MurmurHash3 64-bit finalizer over the key's two's-complement bits.
#[inline]
pub fn int_hash(key: i64) -> u64 {
    let mut h = key as u64;
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    avoid_sentinels(h)
}

/// djb2 (`h * 33 + byte`, seeded with 5381) over every byte of the key.
#[inline]
pub fn string_hash(bytes: &[u8]) -> u64 {
    let h = bytes.iter().fold(5381u64, |h, &b| {
        (h << 5).wrapping_add(h).wrapping_add(u64::from(b))
    });
    avoid_sentinels(h)
}
