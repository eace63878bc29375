// ChainedHashMap unit test suite (consolidated).
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Last write wins: a key resolves to the value most recently set.
// - Size: len counts distinct keys; overwriting never changes it.
// - Capacity: capacity() >= len() after every insert that adds a key.
// - Absence: missing keys are None and leave the map untouched.
// - Capacity control: reserve grows, shrink_* never drop below contents,
//   clear keeps the bucket count.
use chain_hashmap::{ChainedHashMap, ConfigError, MapConfig, ValueHasher, MIN_LOAD_THRESHOLD};
use std::collections::BTreeMap;

fn sorted<K: Ord + Clone, V: Clone>(m: &ChainedHashMap<K, V, impl Sized>) -> Vec<(K, V)> {
    let mut v: Vec<(K, V)> = m.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    v.sort_by(|a, b| a.0.cmp(&b.0));
    v
}

// Test: three inserts at the default size.
// Assumes: 8 buckets at threshold 0.75 grow on the 7th distinct key.
// Verifies: len is 3 and the bucket count is still 8.
#[test]
fn three_inserts_keep_default_buckets() {
    let mut m = ChainedHashMap::new();
    m.insert("one", 1);
    m.insert("two", 2);
    m.insert("three", 3);
    assert_eq!(m.len(), 3);
    assert_eq!(m.buckets(), 8);
    assert_eq!(m.get(&"two"), Some(&2));
}

// Test: reserve on an empty default map.
// Verifies: capacity() covers the request.
#[test]
fn reserve_fifty_on_empty_map() {
    let mut m: ChainedHashMap<u32, u32> = ChainedHashMap::new();
    m.reserve(50);
    assert!(m.capacity() >= 50);
    assert!(m.buckets().is_power_of_two());
}

// Test: removing an absent key.
// Verifies: None is returned and the existing entry is untouched.
#[test]
fn remove_absent_key_is_a_no_op() {
    let mut m = ChainedHashMap::new();
    m.insert("a", 1);
    assert_eq!(m.remove(&"b"), None);
    assert_eq!(m.get(&"a"), Some(&1));
    assert_eq!(m.len(), 1);
}

// Test: 100 sequential integer keys.
// Assumes: several resizes happen along the way (8 -> 16 -> ... -> 256).
// Verifies: every key still resolves to its original value.
#[test]
fn hundred_integer_keys_survive_resizes() {
    let mut m = ChainedHashMap::new();
    for i in 0..100u32 {
        m.insert(i, i * 2);
        assert!(m.capacity() >= m.len());
    }
    assert_eq!(m.len(), 100);
    assert_eq!(m.buckets(), 256);
    for i in 0..100u32 {
        assert_eq!(m.get(&i), Some(&(i * 2)));
    }
}

// Test: last write wins.
// Verifies: overwriting returns the old value, keeps len, keeps buckets.
#[test]
fn overwrite_returns_previous_value() {
    let mut m = ChainedHashMap::new();
    assert_eq!(m.insert("k".to_string(), 1), None);
    let buckets = m.buckets();
    assert_eq!(m.insert("k".to_string(), 2), Some(1));
    assert_eq!(m.len(), 1);
    assert_eq!(m.buckets(), buckets);
    assert_eq!(m[&"k".to_string()], 2);
}

// Test: get_key_value returns the key that was stored first.
#[test]
fn get_key_value_returns_stored_pair() {
    let mut m = ChainedHashMap::new();
    m.insert(7i64, "seven");
    assert_eq!(m.get_key_value(&7), Some((&7, &"seven")));
    assert_eq!(m.get_key_value(&8), None);
    assert!(m.contains_key(&7));
    assert!(!m.contains_key(&8));
}

// Test: remove_entry hands back ownership of the pair.
#[test]
fn remove_entry_returns_owned_pair() {
    let mut m = ChainedHashMap::new();
    m.insert("k".to_string(), vec![1, 2]);
    assert_eq!(
        m.remove_entry(&"k".to_string()),
        Some(("k".to_string(), vec![1, 2]))
    );
    assert!(m.is_empty());
}

// Test: explicit resize is invisible to content.
// Verifies: same pairs before and after growing and shrinking.
#[test]
fn resize_preserves_contents() {
    let mut m: ChainedHashMap<String, usize> =
        (0..50).map(|i| (format!("k{i}"), i)).collect();
    let before = sorted(&m);
    m.resize(1000);
    assert_eq!(m.buckets(), 1024);
    assert_eq!(sorted(&m), before);
    m.resize(3);
    assert_eq!(m.buckets(), 4);
    assert_eq!(sorted(&m), before);
    m.resize(0);
    assert_eq!(m.buckets(), 1);
    assert_eq!(sorted(&m), before);
}

// Test: shrink_to_fit picks the smallest bucket count for the contents.
#[test]
fn shrink_to_fit_after_mass_removal() {
    let mut m: ChainedHashMap<u32, u32> = (0..1000).map(|i| (i, i)).collect();
    for i in 3..1000 {
        m.remove(&i);
    }
    m.shrink_to_fit();
    assert_eq!(m.len(), 3);
    assert_eq!(m.buckets(), 4);
    assert_eq!(m.capacity(), 3);
    for i in 0..3 {
        assert_eq!(m.get(&i), Some(&i));
    }
}

// Test: shrink_to stops at what the contents need.
#[test]
fn shrink_to_never_drops_below_contents() {
    let mut m: ChainedHashMap<u32, u32> = ChainedHashMap::with_capacity(500);
    for i in 0..20 {
        m.insert(i, i);
    }
    m.shrink_to(1);
    assert!(m.capacity() >= 20);
    assert_eq!(m.buckets(), 32);
}

// Test: shrink_to with a request larger than the bucket array.
// Assumes: with_capacity(700) allocates 1024 buckets.
// Verifies: the map still compacts to what shrink_to_fit would pick.
#[test]
fn shrink_to_above_bucket_count_falls_back_to_fit() {
    let mut m: ChainedHashMap<u32, u32> = ChainedHashMap::with_capacity(700);
    assert_eq!(m.buckets(), 1024);
    for i in 0..10 {
        m.insert(i, i);
    }
    m.shrink_to(2000);
    assert_eq!(m.buckets(), 16);
    assert!(m.capacity() >= m.len());
    for i in 0..10 {
        assert_eq!(m.get(&i), Some(&i));
    }
}

// Test: with_capacity pre-sizes so no resize happens until it is exceeded.
#[test]
fn with_capacity_defers_growth() {
    let mut m: ChainedHashMap<u32, u32> = ChainedHashMap::with_capacity(100);
    let buckets = m.buckets();
    assert!(m.capacity() >= 100);
    for i in 0..100 {
        m.insert(i, i);
    }
    assert_eq!(m.buckets(), buckets);
}

// Test: clear empties the map but keeps its bucket count.
#[test]
fn clear_keeps_capacity() {
    let mut m: ChainedHashMap<u32, u32> = (0..100).map(|i| (i, i)).collect();
    let buckets = m.buckets();
    m.clear();
    assert!(m.is_empty());
    assert_eq!(m.buckets(), buckets);
    assert_eq!(m.iter().next(), None);
}

// Test: drain yields every pair once and empties the map.
#[test]
fn drain_yields_each_pair_once() {
    let mut m: ChainedHashMap<u32, u32> = (0..30).map(|i| (i, i + 1)).collect();
    let n = m.len();
    let drained: BTreeMap<u32, u32> = m.drain().collect();
    assert_eq!(drained.len(), n);
    assert!(drained.iter().all(|(k, v)| *v == k + 1));
    assert!(m.is_empty());
    // The map is still usable afterwards.
    m.insert(1, 1);
    assert_eq!(m.len(), 1);
}

// Test: iterators agree with each other and report exact lengths.
#[test]
fn keys_values_and_pairs_agree() {
    let m: ChainedHashMap<u32, u32> = (0..40).map(|i| (i, i * i)).collect();
    let pairs: Vec<(u32, u32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
    let keys: Vec<u32> = m.keys().copied().collect();
    let values: Vec<u32> = m.values().copied().collect();
    assert_eq!(pairs.len(), 40);
    assert_eq!(m.iter().len(), 40);
    assert_eq!(keys, pairs.iter().map(|p| p.0).collect::<Vec<_>>());
    assert_eq!(values, pairs.iter().map(|p| p.1).collect::<Vec<_>>());
    // A fresh call restarts from the beginning.
    assert_eq!(m.keys().next(), keys.first());
}

// Test: mutable iteration updates stored values.
#[test]
fn values_mut_and_iter_mut() {
    let mut m: ChainedHashMap<u32, u32> = (0..10).map(|i| (i, i)).collect();
    for v in m.values_mut() {
        *v += 1;
    }
    for (k, v) in &mut m {
        *v += *k;
    }
    for i in 0..10 {
        assert_eq!(m[&i], 2 * i + 1);
    }
}

// Test: retain and map_values.
#[test]
fn retain_then_map_values() {
    let mut m: ChainedHashMap<u32, u32> = (0..100).map(|i| (i, i)).collect();
    m.retain(|k, _| k % 10 == 0);
    assert_eq!(m.len(), 10);
    m.map_values(|k, v| k + v);
    let got: BTreeMap<u32, u32> = m.into_iter().collect();
    let want: BTreeMap<u32, u32> = (0..10).map(|i| (i * 10, i * 20)).collect();
    assert_eq!(got, want);
}

// Test: building from pairs.
// Verifies: later duplicates win; arrays, vectors and iterators all work.
#[test]
fn from_pairs_last_write_wins() {
    let m: ChainedHashMap<&str, i32> = ChainedHashMap::from([("a", 1), ("b", 2), ("a", 3)]);
    assert_eq!(m.len(), 2);
    assert_eq!(m.get(&"a"), Some(&3));

    let v: ChainedHashMap<&str, i32> = ChainedHashMap::from(vec![("x", 1), ("y", 2)]);
    assert_eq!(v.len(), 2);

    let mut e: ChainedHashMap<&str, i32> = ChainedHashMap::new();
    e.extend([("p", 1), ("q", 2)]);
    assert_eq!(e.len(), 2);
}

// Test: pre-sizing from an exact-size source.
#[test]
fn from_iter_presizes() {
    let m: ChainedHashMap<u32, u32> = (0..100).map(|i| (i, i)).collect();
    assert_eq!(m.buckets(), 256);
    assert!(m.capacity() >= 100);
}

// Test: equality is content equality, independent of bucket layout.
#[test]
fn maps_with_same_pairs_are_equal() {
    let a: ChainedHashMap<u32, u32> = (0..20).map(|i| (i, i)).collect();
    let mut b: ChainedHashMap<u32, u32> = ChainedHashMap::new();
    for i in (0..20).rev() {
        b.insert(i, i);
    }
    b.resize(2);
    assert_eq!(a, b);
    b.insert(0, 99);
    assert_ne!(a, b);
}

// Test: clone is a deep, independent copy.
#[test]
fn clone_is_independent() {
    let mut a: ChainedHashMap<String, u32> = ChainedHashMap::new();
    a.insert("k".into(), 1);
    let mut b = a.clone();
    b.insert("k".into(), 2);
    assert_eq!(a[&"k".to_string()], 1);
    assert_eq!(b[&"k".to_string()], 2);
}

// Test: per-instance configuration and its validation.
#[test]
fn config_is_validated_and_per_instance() {
    let err = ChainedHashMap::<u32, u32>::with_config(
        MapConfig::new().load_threshold(0.0),
        ValueHasher,
    )
    .unwrap_err();
    assert_eq!(err, ConfigError::InvalidLoadThreshold);
    assert!(err
        .to_string()
        .starts_with("load threshold must be finite and at least"));

    let mut tight: ChainedHashMap<u32, u32> = ChainedHashMap::with_config(
        MapConfig::new().initial_buckets(2).load_threshold(0.5),
        ValueHasher,
    )
    .unwrap();
    assert_eq!(tight.capacity(), 1);
    tight.insert(1, 1);
    tight.insert(2, 2);
    assert_eq!(tight.buckets(), 4);
    assert_eq!(tight.load_factor(), 0.5);
}

// Test: vanishingly small thresholds are rejected up front.
// Verifies: a config that validates never yields a map whose first insert
// overflows the bucket math; the smallest accepted threshold still inserts.
#[test]
fn tiny_load_threshold_is_rejected() {
    let err = ChainedHashMap::<u32, u32>::with_config(
        MapConfig::new().load_threshold(1e-300),
        ValueHasher,
    )
    .unwrap_err();
    assert_eq!(err, ConfigError::InvalidLoadThreshold);

    let mut sparse: ChainedHashMap<u32, u32> = ChainedHashMap::with_config(
        MapConfig::new().initial_buckets(1).load_threshold(MIN_LOAD_THRESHOLD),
        ValueHasher,
    )
    .unwrap();
    sparse.insert(1, 1);
    assert_eq!(sparse.buckets(), 64);
    assert_eq!(sparse.capacity(), 1);
    assert_eq!(sparse.get(&1), Some(&1));
}

// Test: floats, chars and bools as keys under the default hasher.
#[test]
fn primitive_key_kinds() {
    let mut f = ChainedHashMap::new();
    f.insert(0.0f64, "zero");
    assert_eq!(f.get(&-0.0), Some(&"zero"));
    f.insert(f64::NAN, "nan");
    f.insert(f64::NAN, "nan");
    // NaN never equals itself, so each insert adds a key and none can be found.
    assert_eq!(f.len(), 3);
    assert_eq!(f.get(&f64::NAN), None);

    let mut b = ChainedHashMap::new();
    b.insert(true, 1);
    b.insert(false, 0);
    assert_eq!(b.get(&true), Some(&1));
}

// Test: indexing a missing key panics.
#[test]
#[should_panic(expected = "key not present")]
fn index_panics_on_missing_key() {
    let m: ChainedHashMap<u32, u32> = ChainedHashMap::new();
    let _v = m[&1];
}

// Test: Debug renders as a map.
#[test]
fn debug_format() {
    let mut m: ChainedHashMap<u32, &str> = ChainedHashMap::new();
    m.insert(1, "a");
    assert_eq!(format!("{m:?}"), r#"{1: "a"}"#);
}

// Test: entry("x").or_insert_with(f) on an absent key.
// Verifies: f runs exactly once and its result is stored; a second call on
// the now-present key does not run f.
#[test]
fn or_insert_with_calls_factory_once() {
    let mut m: ChainedHashMap<String, usize> = ChainedHashMap::new();
    let mut calls = 0;
    m.entry("x".to_string()).or_insert_with(|k| {
        calls += 1;
        k.len() * 10
    });
    assert_eq!(calls, 1);
    assert_eq!(m.get(&"x".to_string()), Some(&10));
    m.entry("x".to_string()).or_insert_with(|_| {
        calls += 1;
        0
    });
    assert_eq!(calls, 1);
    assert_eq!(m.get(&"x".to_string()), Some(&10));
}
