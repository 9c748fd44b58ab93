//! Prime capacities.
//!
//! Every capacity the table picks for itself goes through `snap_to_prime`.
//! Small requests are served from a table of the first prime after each
//! power of two (from 2^2 up); larger ones fall back to trial division.

/// Next prime after 2^n, for n = 2, 3, ..., 22.
const PRIMES: [usize; 21] = [
    5, 11, 23, 47, 97, 197, 397, 797, 1597, 3203, 6421, 12853, 25717, 51437, 102877, 205759,
    411527, 823117, 1646237, 3292489, 6584983,
];

/// Smallest prime `>= x`, except that requests up to 5 yield 5 and
/// requests within the table yield the table entry, which can be larger
/// than the smallest prime (`snap_to_prime(38) == 47`).
///
/// Saturates at `usize::MAX` if the search runs off the end of `usize`;
/// no allocation of that many slots can succeed anyway.
pub fn snap_to_prime(x: usize) -> usize {
    if let Some(&p) = PRIMES.iter().find(|&&p| p >= x) {
        return p;
    }

    let mut candidate = x | 1;
    while !is_odd_prime(candidate) {
        candidate = match candidate.checked_add(2) {
            Some(c) => c,
            None => return usize::MAX,
        };
    }
    candidate
}

/// Trial division by odd numbers. Only meaningful for odd `x >= 3`.
fn is_odd_prime(x: usize) -> bool {
    let mut i = 3;
    loop {
        if x / i < i {
            return true;
        }
        if x % i == 0 {
            return false;
        }
        i += 2;
    }
}
