#![cfg(test)]

use super::{DefaultHashBuilder, Flow, NumTable, TryReserveError, h2};
use std::{
    collections::{HashSet, hash_map::RandomState},
    hash::BuildHasher,
};

#[test]
fn test_create_empty() {
    let m: NumTable<usize, usize> = NumTable::new();
    assert_eq!(m.len(), 0);
    assert!(m.is_empty());
    assert_eq!(m.capacity(), 0);
    assert_eq!(m.lookup(&1), None);
    assert_eq!(m.iter().count(), 0);
}

#[test]
fn test_create_capacity_zero() {
    let mut m = NumTable::with_capacity(0);

    assert!(m.insert(1, 1).is_none());

    assert!(m.contains_key(&1));
    assert!(!m.contains_key(&0));
}

#[test]
fn test_create_with_size() {
    let m: NumTable<usize, usize> = NumTable::with_capacity(128);
    assert_eq!(m.len(), 0);
    assert!(m.capacity() >= 128);
}

#[test]
fn test_insert() {
    let mut m = NumTable::new();
    assert_eq!(m.len(), 0);
    assert!(m.insert(1, 2).is_none());
    assert_eq!(m.len(), 1);
    assert!(m.insert(2, 4).is_none());
    assert_eq!(m.len(), 2);
    assert_eq!(*m.get(&1).unwrap(), 2);
    assert_eq!(*m.get(&2).unwrap(), 4);
}

#[test]
fn test_insert_overwrite() {
    let mut m = NumTable::with_capacity(128);
    assert!(m.insert(1, 2).is_none());
    assert_eq!(m.lookup(&1), Some(2));
    assert_eq!(m.insert(1, 3), Some(2));
    assert_eq!(m.lookup(&1), Some(3));
    assert_eq!(m.len(), 1);
}

#[test]
fn test_lookup() {
    let mut m = NumTable::with_capacity(128);
    m.insert(7, 42);
    m.insert(2, 4);
    assert_eq!(m.lookup(&7), Some(42));
    assert_eq!(m.lookup(&2), Some(4));
    assert_eq!(m.lookup(&3), None);
}

#[test]
fn test_foreach_sum() {
    let mut m = NumTable::with_capacity(128);
    m.insert(1, 3);
    m.insert(2, 4);

    let mut total = 0;
    let flow = m.foreach(|_, v| {
        total += *v;
        Flow::Continue
    });

    assert_eq!(total, 7);
    assert_eq!(flow, Flow::Continue);
}

#[test]
fn test_foreach_stop() {
    let m: NumTable<u64, u64> = (0..100).map(|i| (i, i * 2)).collect();

    let mut visited = 0;
    let flow = m.foreach(|_, _| {
        visited += 1;
        Flow::Stop
    });

    assert_eq!(visited, 1);
    assert_eq!(flow, Flow::Stop);

    let mut visited = 0;
    m.foreach(|_, _| {
        visited += 1;
        if visited == 10 {
            Flow::Stop
        } else {
            Flow::Continue
        }
    });
    assert_eq!(visited, 10);
}

#[test]
fn test_foreach_visits_each_once() {
    let m: NumTable<u64, u64> = (0..500).map(|i| (i, i)).collect();

    let mut seen = vec![0; 500];
    m.foreach(|k, v| {
        assert_eq!(k, v);
        seen[*k as usize] += 1;
        Flow::Continue
    });

    assert!(seen.iter().all(|&n| n == 1));
}

#[test]
fn test_iter() {
    let mut m = NumTable::new();
    assert!(m.insert(1, 2).is_none());
    assert!(m.insert(5, 3).is_none());
    assert!(m.insert(2, 4).is_none());
    assert!(m.insert(9, 4).is_none());

    let mut v: Vec<(i32, i32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
    v.sort_by_key(|k| k.0);

    assert_eq!(v, vec![(1, 2), (2, 4), (5, 3), (9, 4)]);
    assert_eq!(m.iter().len(), 4);

    let mut keys: Vec<i32> = m.keys().copied().collect();
    keys.sort();
    assert_eq!(keys, vec![1, 2, 5, 9]);

    let sum: i32 = m.values().sum();
    assert_eq!(sum, 13);
}

#[test]
fn test_insert_conflicts() {
    let mut m = NumTable::with_capacity(4);
    assert!(m.insert(1, 2).is_none());
    assert!(m.insert(5, 3).is_none());
    assert!(m.insert(9, 4).is_none());
    assert_eq!(*m.get(&9).unwrap(), 4);
    assert_eq!(*m.get(&5).unwrap(), 3);
    assert_eq!(*m.get(&1).unwrap(), 2);
}

#[test]
fn test_low_bit_collisions() {
    // Keys that are equal modulo the bucket count.
    let mut m = NumTable::with_capacity(8);
    for i in 0..64u64 {
        m.insert(i * 1024, i);
    }
    assert_eq!(m.len(), 64);
    for i in 0..64u64 {
        assert_eq!(m.lookup(&(i * 1024)), Some(i));
    }
}

#[test]
fn test_expand() {
    let mut m = NumTable::new();

    assert_eq!(m.len(), 0);
    assert!(m.is_empty());

    let mut i = 0;
    let old_raw_cap = m.capacity();
    while old_raw_cap == m.capacity() {
        m.insert(i, i);
        i += 1;
    }

    assert_eq!(m.len(), i);
    assert!(!m.is_empty());
}

#[test]
fn test_grow_many() {
    let mut m = NumTable::new();
    for i in 0..10_000usize {
        assert!(m.insert(i, i + 1).is_none());
        assert_eq!(m.len(), i + 1);
    }
    for i in 0..10_000usize {
        assert_eq!(m.lookup(&i), Some(i + 1));
    }
    assert_eq!(m.lookup(&10_000), None);
    assert!(m.capacity() >= m.len());
}

#[test]
fn test_reserve() {
    let mut m: NumTable<u32, u32> = NumTable::new();
    m.reserve(100);
    let cap = m.capacity();
    assert!(cap >= 100);
    for i in 0..100 {
        m.insert(i, i);
    }
    assert_eq!(m.capacity(), cap);
}

#[test]
fn test_try_reserve() {
    let mut empty_bytes: NumTable<u8, u8> = NumTable::new();

    const MAX_USIZE: usize = usize::MAX;

    assert_eq!(
        empty_bytes.try_reserve(MAX_USIZE),
        Err(TryReserveError::CapacityOverflow)
    );
    assert_eq!(
        empty_bytes.try_reserve(MAX_USIZE / 8),
        Err(TryReserveError::CapacityOverflow)
    );

    assert!(empty_bytes.try_reserve(10).is_ok());
    assert!(empty_bytes.capacity() >= 10);
}

#[test]
fn test_try_reserve_error_display() {
    let err = TryReserveError::CapacityOverflow;
    assert!(err.to_string().contains("capacity overflow"));
}

#[test]
fn test_insert_new() {
    let mut m = NumTable::new();
    for i in 0..50u32 {
        m.insert_new(i, i * 3);
    }
    assert_eq!(m.len(), 50);
    assert_eq!(m.lookup(&7), Some(21));
}

#[test]
fn test_update() {
    let mut m: NumTable<u32, u32> = NumTable::new();
    assert!(!m.update(1, |old| old.copied().unwrap_or(0) + 1));
    assert!(m.update(1, |old| old.copied().unwrap_or(0) + 1));
    assert_eq!(m.lookup(&1), Some(2));
    assert_eq!(m.len(), 1);
}

#[test]
fn test_get_mut() {
    let mut m = NumTable::new();
    m.insert(3, 10);
    *m.get_mut(&3).unwrap() += 5;
    assert_eq!(m.lookup(&3), Some(15));
    assert!(m.get_mut(&4).is_none());
}

#[test]
fn test_clear() {
    let mut m: NumTable<u64, u64> = (0..40).map(|i| (i, i)).collect();
    let cap = m.capacity();

    m.clear();

    assert_eq!(m.len(), 0);
    assert_eq!(m.capacity(), cap);
    assert_eq!(m.lookup(&3), None);
    assert_eq!(m.iter().count(), 0);

    m.insert(3, 4);
    assert_eq!(m.lookup(&3), Some(4));
}

#[test]
fn test_clone_is_independent() {
    let mut m = NumTable::new();
    m.insert(1, 1);
    let mut c = m.clone();
    c.insert(1, 2);
    c.insert(2, 2);

    assert_eq!(m.lookup(&1), Some(1));
    assert_eq!(m.len(), 1);
    assert_eq!(c.lookup(&1), Some(2));
    assert_eq!(c.len(), 2);
}

#[test]
fn test_custom_hasher() {
    let mut m = NumTable::with_capacity_and_hasher(16, RandomState::new());
    m.insert(1u64, "one");
    m.insert(2u64, "two");
    assert_eq!(m.get(&2), Some(&"two"));
    assert_eq!(m.len(), 2);
}

#[test]
fn test_hasher() {
    let s = DefaultHashBuilder::new();
    let m: NumTable<u64, u64> = NumTable::with_hasher(s.clone());
    for k in [0u64, 1, 42, u64::MAX] {
        assert_eq!(BuildHasher::hash_one(m.hasher(), k), BuildHasher::hash_one(&s, k));
    }
}

#[test]
fn test_hash_tags_spread() {
    let s = DefaultHashBuilder::default();
    let tags: HashSet<u8> = (0..1024u64)
        .map(|k| h2(BuildHasher::hash_one(&s, k)))
        .collect();
    assert!(tags.len() > 64, "only {} distinct tags", tags.len());
}

#[test]
fn test_into_iter_ref() {
    let m: NumTable<u64, u64> = (0..10).map(|k| (k, k * 2)).collect();
    let mut seen = Vec::new();
    for (k, v) in &m {
        assert_eq!(*v, *k * 2);
        seen.push(*k);
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..10).collect::<Vec<_>>());
}

#[test]
fn test_memsize() {
    let empty: NumTable<u64, u64> = NumTable::new();
    let sized: NumTable<u64, u64> = NumTable::with_capacity(128);
    assert!(sized.memsize() > empty.memsize());
}

#[test]
fn test_debug() {
    let mut m = NumTable::new();
    m.insert(1, 2);
    assert_eq!(format!("{:?}", m), "{1: 2}");
}

#[test]
fn test_free() {
    let mut m = NumTable::with_capacity(128);
    m.insert(1, 1);
    m.free();
}
