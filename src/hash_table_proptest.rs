#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can observe
// tombstone counts and epochs.

use crate::error::TableError;
use crate::hash_table::{Dict, HashTable, IntHash};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

fn is_prime(n: usize) -> bool {
    n >= 2 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0)
}

// Pool-indexed operations: indices shrink to earlier keys, and op lists
// shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    PutWith(usize, i32),
    Remove(usize),
    Get(usize),
    Mutate(usize, i32),
    Resize(usize),
    // Scan with start/next and remove every element whose value is odd.
    RemoveOddDuringScan,
    Iterate,
}

fn arb_ops(pool_len: usize) -> impl Strategy<Value = Vec<OpI>> {
    let idx = 0..pool_len;
    let op = prop_oneof![
        4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
        2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::PutWith(i, v)),
        3 => idx.clone().prop_map(OpI::Remove),
        2 => idx.clone().prop_map(OpI::Get),
        1 => (idx, any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
        1 => (0usize..64).prop_map(OpI::Resize),
        1 => Just(OpI::RemoveOddDuringScan),
        1 => Just(OpI::Iterate),
    ];
    proptest::collection::vec(op, 1..120)
}

fn arb_int_scenario() -> impl Strategy<Value = (Vec<i64>, Vec<OpI>)> {
    proptest::collection::vec(any::<i64>(), 1..=24)
        .prop_flat_map(|pool| (Just(pool.clone()), arb_ops(pool.len())))
}

fn arb_dict_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,6}", 1..=24)
        .prop_flat_map(|pool| (Just(pool.clone()), arb_ops(pool.len())))
}

/// Replays `ops` against the table and a std model, checking the table's
/// structural invariants after every step.
fn run_state_machine<K>(
    sut: &mut HashTable<K, i32>,
    pool: &[K],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    K: crate::hashing::Key + Clone + Ord + std::hash::Hash + std::fmt::Debug,
{
    let mut model: HashMap<K, i32> = HashMap::new();

    for op in ops {
        let capacity_before = sut.capacity();
        let epoch_before = sut.epoch();
        match op {
            OpI::Put(i, v) => {
                let k = pool[i].clone();
                let prev = sut.put(k.clone(), v).expect("small tables always allocate");
                prop_assert_eq!(prev, model.insert(k, v));
            }
            OpI::PutWith(i, v) => {
                let k = pool[i].clone();
                let existed = model.contains_key(&k);
                let mut ran = false;
                let slot = sut
                    .put_with(k.clone(), || {
                        ran = true;
                        v
                    })
                    .expect("small tables always allocate");
                let expected = *model.entry(k).or_insert(v);
                prop_assert_eq!(*slot, expected);
                prop_assert_eq!(ran, !existed, "default runs exactly when inserting");
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k), model.remove(k));
                prop_assert!(!sut.contains_key(k));
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
                prop_assert_eq!(sut.contains_key(k), model.contains_key(k));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k), model.get_mut(k)) {
                    (Some(s), Some(m)) => {
                        *s = s.wrapping_add(d);
                        *m = m.wrapping_add(d);
                    }
                    (None, None) => {}
                    (s, m) => prop_assert!(false, "presence differs: {:?} vs {:?}", s, m),
                }
            }
            OpI::Resize(cap) => {
                let len = sut.len();
                match sut.resize(cap) {
                    Ok(()) => {}
                    // Saturated rebuilds are allowed to be refused.
                    Err(TableError::ProbeExhausted { .. }) => {
                        prop_assert_eq!(sut.capacity(), capacity_before);
                        prop_assert_eq!(sut.epoch(), epoch_before);
                    }
                    Err(e) => prop_assert!(false, "unexpected resize error: {}", e),
                }
                prop_assert_eq!(sut.len(), len);
            }
            OpI::RemoveOddDuringScan => {
                let capacity = sut.capacity();
                let mut cursor = sut.start();
                while let Some(c) = cursor {
                    let v = *c.value(sut).expect("cursor from start/next is live");
                    if v % 2 != 0 {
                        let (k, rv) = sut.remove_at(c).expect("live cursor");
                        prop_assert_eq!(rv, v);
                        prop_assert_eq!(model.remove(&k), Some(v));
                    }
                    cursor = sut.next(c).expect("no rebuild during scan");
                }
                prop_assert_eq!(sut.capacity(), capacity);
                model.retain(|_, v| *v % 2 == 0);
            }
            OpI::Iterate => {
                let seen: Vec<(K, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(seen.len(), sut.len());
                let seen: BTreeMap<K, i32> = seen.into_iter().collect();
                prop_assert_eq!(seen.len(), sut.len(), "a key was visited twice");
                let expected: BTreeMap<K, i32> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(seen, expected);
            }
        }

        // Post-conditions after each op
        // 1) Length parity and capacity bound.
        prop_assert_eq!(sut.len(), model.len());
        prop_assert!(sut.capacity() >= sut.len());
        // 2) Any rebuild lands on a prime capacity and clears tombstones.
        if sut.epoch() != epoch_before {
            prop_assert!(is_prime(sut.capacity()), "capacity {}", sut.capacity());
        }
        // 3) Elements and tombstones together fit in the storage.
        prop_assert!(sut.len() + sut.tombstones() <= sut.capacity());
        // 4) Every tracked key is visible, every untracked one is not.
        for k in pool {
            prop_assert_eq!(sut.get(k), model.get(k));
        }
    }

    let keys: BTreeSet<K> = sut.keys().cloned().collect();
    let expected: BTreeSet<K> = model.keys().cloned().collect();
    prop_assert_eq!(keys, expected);
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap for
// integer keys, starting from an unallocated table.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_int_state_machine((pool, ops) in arb_int_scenario()) {
        let mut sut: IntHash<i32> = HashTable::new();
        run_state_machine(&mut sut, &pool, ops)?;
    }
}

// Property: same invariants for string keys, with a short alphabet so the
// pool has duplicates and djb2 collisions modulo small primes are common.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_dict_state_machine((pool, ops) in arb_dict_scenario()) {
        let mut sut: Dict<i32> = Dict::new();
        run_state_machine(&mut sut, &pool, ops)?;
    }
}

// Property: starting from a single slot forces growth on the first insert
// and heavy probing at every size after.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_int_state_machine_from_one_slot((pool, ops) in arb_int_scenario()) {
        let mut sut: IntHash<i32> = HashTable::with_capacity(1).unwrap();
        run_state_machine(&mut sut, &pool, ops)?;
    }
}
