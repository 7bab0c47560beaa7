// Property tests for ChainedHashMap kept inside the crate so they can check
// the bucket structure directly, not just the public results.

use crate::chained_hash_map::{ChainedHashMap, MapError, LOAD_FACTOR};
use crate::key_hash::KeyHash;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct Key(String);
impl KeyHash for Key {
    fn key_hash(&self) -> i32 {
        self.0.key_hash()
    }
}

// Every key lands in the same bucket; only `Eq` tells them apart.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct CollidingKey(String);
impl KeyHash for CollidingKey {
    fn key_hash(&self) -> i32 {
        7
    }
}

// Pool-indexed operations so shrinking walks toward earlier keys and
// shorter sequences.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Get(usize),
    Remove(usize),
    Bump(usize, i32),
    PutAbsent(i32),
    GetAbsent,
    RemoveAbsent,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            2 => idx.clone().prop_map(Op::Get),
            2 => idx.clone().prop_map(Op::Remove),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Bump(i, d)),
            1 => any::<i32>().prop_map(Op::PutAbsent),
            1 => Just(Op::GetAbsent),
            1 => Just(Op::RemoveAbsent),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// State-machine equivalence against std::collections::HashMap.
// After every step:
// - results (values, NotFound, removal flags) match the model;
// - absent keys fail with InvalidKey and change neither len nor capacity;
// - len matches the model and stays within capacity * LOAD_FACTOR;
// - every entry is reachable once, sits in its hashed bucket, and no chain
//   holds duplicate keys;
// - capacity never decreases.
fn run_scenario<K>(
    make_key: fn(&str) -> K,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    K: KeyHash + Eq + Hash + Clone + Debug,
{
    let mut sut: ChainedHashMap<Option<K>, i32> = ChainedHashMap::new();
    let mut model: HashMap<K, i32> = HashMap::new();
    let mut last_capacity = sut.capacity();

    for op in ops {
        match op {
            Op::Put(i, v) => {
                let k = make_key(&pool[i]);
                prop_assert_eq!(sut.put(Some(k.clone()), v), Ok(()));
                model.insert(k, v);
            }
            Op::Get(i) => {
                let k = make_key(&pool[i]);
                let expected = model.get(&k).ok_or(MapError::NotFound);
                prop_assert_eq!(sut.get(&Some(k)), expected);
            }
            Op::Remove(i) => {
                let k = make_key(&pool[i]);
                let was_present = model.remove(&k).is_some();
                prop_assert_eq!(sut.remove(&Some(k)), Ok(was_present));
            }
            Op::Bump(i, d) => {
                let k = make_key(&pool[i]);
                match sut.get_mut(&Some(k.clone())) {
                    Ok(v) => {
                        *v = v.wrapping_add(d);
                        let mv = model.get_mut(&k).expect("present in model");
                        *mv = mv.wrapping_add(d);
                    }
                    Err(e) => {
                        prop_assert_eq!(e, MapError::NotFound);
                        prop_assert!(!model.contains_key(&k));
                    }
                }
            }
            Op::PutAbsent(v) => {
                let (len, cap) = (sut.len(), sut.capacity());
                prop_assert_eq!(sut.put(None, v), Err(MapError::InvalidKey));
                prop_assert_eq!((sut.len(), sut.capacity()), (len, cap));
            }
            Op::GetAbsent => {
                prop_assert_eq!(sut.get(&None::<K>), Err(MapError::InvalidKey));
            }
            Op::RemoveAbsent => {
                let len = sut.len();
                prop_assert_eq!(sut.remove(&None::<K>), Err(MapError::InvalidKey));
                prop_assert_eq!(sut.len(), len);
            }
        }

        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.len() as f64 <= sut.capacity() as f64 * LOAD_FACTOR);
        prop_assert!(sut.capacity() >= last_capacity);
        last_capacity = sut.capacity();
    }

    // Everything still live resolves to its last value.
    for (k, v) in &model {
        prop_assert_eq!(sut.get(&Some(k.clone())), Ok(v));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(|s| Key(s.to_string()), &pool, ops)?;
    }
}

// Same invariants with every key in one chain, stressing chain walks,
// tail appends and unlinking from arbitrary positions.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(|s| CollidingKey(s.to_string()), &pool, ops)?;
    }
}

// Round trip over many distinct integer keys, across several resizes.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_growth_keeps_every_key(keys in proptest::collection::hash_set(any::<i64>(), 0..400)) {
        let mut sut: ChainedHashMap<i64, i64> = ChainedHashMap::new();
        for &k in &keys {
            sut.put(k, k.wrapping_mul(3)).unwrap();
            prop_assert!(sut.len() as f64 <= sut.capacity() as f64 * LOAD_FACTOR);
        }
        prop_assert_eq!(sut.len(), keys.len());
        for &k in &keys {
            let expected = k.wrapping_mul(3);
            prop_assert_eq!(sut.get(&k), Ok(&expected));
        }
        sut.assert_invariants();
    }
}
