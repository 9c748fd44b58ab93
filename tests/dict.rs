// Dict (string-keyed personality) test suite.
//
// Same engine as IntHash; these tests pin down what is specific to string
// keys:
// - Borrowed lookup: a `Dict<V>` stores `String` and is queried with `&str`.
// - Key bytes survive rebuilds: iterating after growth or shrink yields the
//   original strings unchanged.
// - Byte-string keys (`ByteDict`) compare bytewise, including non-UTF-8.
use std::collections::BTreeMap;
use unified_hash::{ByteDict, Dict, Discipline, HashTable, TableError};

#[test]
fn put_and_get() {
    let mut d: Dict<i32> = Dict::new();
    d.put("foo".to_string(), 0).unwrap();
    d.put("bar".to_string(), 8).unwrap();
    d.put("hurdelgrumpf".to_string(), 15).unwrap();
    assert_eq!(d.len(), 3);
    assert_eq!(d.discipline(), Discipline::String);

    assert_eq!(d.get("foo"), Some(&0));
    assert_eq!(d.get("hurdelgrumpf"), Some(&15));
    assert_eq!(d.get("bar"), Some(&8));
    assert_eq!(d.get("baz"), None);
    assert!(d.contains_key(&"bar".to_string()));
}

// Test: the empty string is an ordinary key.
#[test]
fn empty_string_key() {
    let mut d: Dict<u8> = Dict::new();
    d.put(String::new(), 1).unwrap();
    assert_eq!(d.get(""), Some(&1));
    assert_eq!(d.remove(""), Some(1));
    assert!(!d.contains_key(""));
}

// Test: a one-slot dict grows on its first insert; iterating afterwards
// must hand back the original key, not a mangled one.
#[test]
fn resize_keeps_string_keys() {
    let mut d: Dict<i32> = HashTable::with_capacity(1).unwrap();
    d.put("foo".to_string(), 1572).unwrap();
    assert_eq!(d.len(), 1);
    assert_eq!(d.capacity(), 5);

    // Walk slot memory rather than looking up by key: a lookup would hash
    // the query the same way and could hide a corrupted stored key.
    let mut cursor = d.start();
    let mut visited = 0;
    while let Some(c) = cursor {
        assert_eq!(c.key(&d).map(String::as_str), Some("foo"));
        assert_eq!(c.value(&d), Some(&1572));
        visited += 1;
        cursor = d.next(c).unwrap();
    }
    assert_eq!(visited, 1);
}

// Test: repeated grow and shrink cycles (5 -> 47 -> 5) preserve every
// remaining key's bytes and value.
#[test]
fn keys_survive_grow_and_shrink_cycles() {
    let mut d: Dict<usize> = Dict::new();
    let mut kept: Vec<String> = Vec::new();

    for round in 0..5 {
        for k in kept.drain(..) {
            assert!(d.remove(&k).is_some());
        }
        let keys: Vec<String> = (0..30).map(|i| format!("r{round}-key-{i:02}")).collect();
        for (i, k) in keys.iter().enumerate() {
            d.put(k.clone(), i).unwrap();
        }
        assert_eq!(d.capacity(), 47);

        for k in &keys[..28] {
            assert!(d.remove(k.as_str()).is_some());
        }
        assert_eq!(d.capacity(), 5);
        kept.extend_from_slice(&keys[28..]);
    }

    let seen: BTreeMap<String, usize> = d.iter().map(|(k, v)| (k.clone(), *v)).collect();
    let expected: BTreeMap<String, usize> = [
        ("r4-key-28".to_string(), 28),
        ("r4-key-29".to_string(), 29),
    ]
    .into_iter()
    .collect();
    assert_eq!(seen, expected);
}

// Test: removing through cursors during a scan never changes capacity, even
// when the dict drops far below the shrink threshold.
#[test]
fn remove_at_does_not_shrink() {
    let mut d: Dict<u32> = Dict::new();
    for i in 0..50u32 {
        d.put(format!("k{i}"), i).unwrap();
    }
    let capacity = d.capacity();

    let mut cursor = d.start();
    while let Some(c) = cursor {
        let (k, v) = d.remove_at(c).unwrap();
        assert_eq!(k, format!("k{v}"));
        cursor = d.next(c).unwrap();
    }
    assert!(d.is_empty());
    assert_eq!(d.capacity(), capacity);

    // The next keyed removal of an absent key changes nothing either.
    assert_eq!(d.remove("k0"), None);
    assert_eq!(d.capacity(), capacity);
}

// Test: a cursor whose element was removed yields no key or value but can
// still advance.
#[test]
fn vacated_cursor_advances() {
    let mut d: Dict<i32> = Dict::new();
    d.put("a".to_string(), 1).unwrap();
    d.put("b".to_string(), 2).unwrap();
    let first = d.start().unwrap();
    d.remove_at(first).unwrap();

    assert!(d.key_at(first).is_none());
    assert!(d.value_at(first).is_none());
    assert!(matches!(
        d.remove_at(first),
        Err(TableError::VacantSlot { .. })
    ));
    let second = d.next(first).unwrap().expect("one element left");
    assert!(d.key_at(second).is_some());
    assert_eq!(d.len(), 1);
}

// Test: byte-string keys, including invalid UTF-8, round-trip and are
// queried by slice.
#[test]
fn byte_dict_keys() {
    let mut d: ByteDict<&str> = ByteDict::new();
    d.put(vec![0xff, 0xfe], "invalid utf-8").unwrap();
    d.put(b"foo".to_vec(), "foo").unwrap();
    d.put(Vec::new(), "empty").unwrap();

    assert_eq!(d.get(&[0xffu8, 0xfe][..]), Some(&"invalid utf-8"));
    assert_eq!(d.get(&b"foo"[..]), Some(&"foo"));
    assert_eq!(d.get(&[0u8; 0][..]), Some(&"empty"));
    assert_eq!(d.get(&b"fo"[..]), None);
    assert_eq!(d.len(), 3);
}

// Test: get_mut and iter_mut write through to stored values.
#[test]
fn mutation_through_accessors() {
    let mut d: Dict<Vec<u8>> = Dict::new();
    d.put("x".to_string(), vec![1]).unwrap();
    d.put("y".to_string(), vec![2]).unwrap();

    d.get_mut("x").unwrap().push(10);
    for (_, v) in d.iter_mut() {
        v.push(0);
    }
    assert_eq!(d.get("x"), Some(&vec![1, 10, 0]));
    assert_eq!(d.get("y"), Some(&vec![2, 0]));
}
