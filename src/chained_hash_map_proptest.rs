#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can check
// bucket-level invariants that the public API does not expose.

use crate::chained_hash_map::ChainedHashMap;
use crate::key_hasher::{KeyHasher, ValueHasher};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeMap, BTreeSet, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    OrInsert(usize, i32),
    RetainEven,
    Resize(usize),
    ShrinkToFit,
    ShrinkTo(usize),
    Reserve(usize),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::OrInsert(i, v)),
            1 => Just(OpI::RetainEven),
            1 => (0usize..64).prop_map(OpI::Resize),
            1 => Just(OpI::ShrinkToFit),
            1 => (0usize..200).prop_map(OpI::ShrinkTo),
            1 => (0usize..100).prop_map(OpI::Reserve),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// Structural invariants: power-of-two buckets, `len` equals the number of
/// stored pairs, every pair sits in the bucket its stored hash selects, and
/// that stored hash is what the hasher produces now.
fn check_structure<H: KeyHasher<String>>(
    sut: &ChainedHashMap<String, i32, H>,
) -> Result<(), TestCaseError> {
    let store = sut.bucket_store();
    let buckets = store.as_slice();
    prop_assert!(buckets.len().is_power_of_two());
    let mut total = 0;
    for (i, bucket) in buckets.iter().enumerate() {
        for s in bucket {
            prop_assert_eq!(store.index_of(s.hash), i);
            prop_assert_eq!(sut.hasher().hash(&s.key), s.hash);
            total += 1;
        }
    }
    prop_assert_eq!(total, sut.len());
    Ok(())
}

fn run_scenario<H: KeyHasher<String>>(
    mut sut: ChainedHashMap<String, i32, H>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i].clone();
                let prev = sut.insert(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
                if prev.is_none() {
                    prop_assert!(sut.capacity() >= sut.len(), "growing insert must leave room");
                }
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k), model.remove(k));
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
                prop_assert_eq!(
                    sut.get_key_value(k).map(|(kk, _)| kk.clone()),
                    model.get_key_value(k).map(|(kk, _)| kk.clone())
                );
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                if let Some(v) = sut.get_mut(k) {
                    *v = v.saturating_add(d);
                }
                if let Some(v) = model.get_mut(k) {
                    *v = v.saturating_add(d);
                }
            }
            OpI::OrInsert(i, v) => {
                let k = pool[i].clone();
                let got = sut.entry(k.clone()).or_insert(v).get().copied();
                let want = *model.entry(k).or_insert(v);
                prop_assert_eq!(got, Some(want));
            }
            OpI::RetainEven => {
                sut.retain(|_, v| *v % 2 == 0);
                model.retain(|_, v| *v % 2 == 0);
            }
            OpI::Resize(n) => {
                sut.resize(n);
                prop_assert_eq!(sut.buckets(), n.max(1).next_power_of_two());
            }
            OpI::ShrinkToFit => {
                sut.shrink_to_fit();
                prop_assert!(sut.capacity() >= sut.len());
            }
            OpI::ShrinkTo(n) => {
                let before = sut.buckets();
                sut.shrink_to(n);
                prop_assert!(sut.capacity() >= sut.len());
                if sut.buckets() > before {
                    // Only a map left overfull by an explicit resize grows.
                    prop_assert!(before / 2 < sut.len().max(1));
                }
            }
            OpI::Reserve(n) => {
                let before = sut.buckets();
                sut.reserve(n);
                prop_assert!(sut.capacity() >= sut.len() + n);
                prop_assert!(sut.buckets() >= before, "reserve never shrinks");
            }
            OpI::Clear => {
                let before = sut.buckets();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.buckets(), before);
            }
            OpI::Iterate => {
                let s: BTreeMap<_, _> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m: BTreeMap<_, _> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s, m);
                prop_assert_eq!(sut.keys().len(), model.len());
            }
        }

        check_structure(&sut)?;
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }

    // Drain yields exactly the live pairs and leaves the map empty.
    let drained: BTreeSet<_> = sut.drain().map(|(k, _)| k).collect();
    let expected: BTreeSet<_> = model.into_keys().collect();
    prop_assert_eq!(drained, expected);
    prop_assert!(sut.is_empty());
    check_structure(&sut)
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Insert returns the replaced value (last write wins) and never leaves the
//   map above its load threshold.
// - get/get_key_value/contains_key/remove parity with the model.
// - Resizes, shrinks and reserves never change observable contents.
// - `len` equals the number of stored pairs and every pair sits in the
//   bucket its hash selects, after every op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(ChainedHashMap::with_hasher(ValueHasher), &pool, ops)?;
    }
}

// Collision variant: every key hashes to the same value, so all pairs share
// one chain and equality alone tells them apart.
#[derive(Clone, Default)]
struct ConstHasher;

impl KeyHasher<String> for ConstHasher {
    fn hash(&self, _key: &String) -> i32 {
        -7
    }
    fn equals(&self, a: &String, b: &String) -> bool {
        a == b
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(ChainedHashMap::with_hasher(ConstHasher), &pool, ops)?;
    }
}
