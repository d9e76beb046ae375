//! Batch-level invariants: isolation and schedule independence.

use std::collections::HashMap;

use proptest::prelude::*;

use crate::common::params;
use hybridrank::{fuse, BatchCoordinator, Concurrency, RankedList};

fn list_strategy(max: usize) -> impl Strategy<Value = RankedList> {
    prop::collection::hash_map((0u8..16).prop_map(|n| format!("d{}", n)), -10.0f32..10.0, 0..max)
        .prop_map(|m| RankedList::from_pairs(m).expect("hash map keys are unique"))
}

/// Per query: a sparse list, a dense list, each possibly empty.
fn batch_strategy() -> impl Strategy<Value = Vec<(RankedList, RankedList)>> {
    prop::collection::vec((list_strategy(8), list_strategy(8)), 1..12)
}

fn split(
    batch: Vec<(RankedList, RankedList)>,
) -> (Vec<u32>, HashMap<u32, RankedList>, HashMap<u32, RankedList>) {
    let mut ids = Vec::new();
    let mut sparse = HashMap::new();
    let mut dense = HashMap::new();
    for (qid, (s, d)) in batch.into_iter().enumerate() {
        let qid = qid as u32;
        ids.push(qid);
        sparse.insert(qid, s);
        dense.insert(qid, d);
    }
    (ids, sparse, dense)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_every_query_accounted_for(batch in batch_strategy(), k in 1usize..10) {
        let (ids, sparse, dense) = split(batch);
        let outcome = BatchCoordinator::new(params(1.0, k))
            .fuse_batch(&ids, sparse, dense)
            .unwrap();
        prop_assert_eq!(outcome.results.len() + outcome.failures.len(), ids.len());
        for qid in outcome.failed_ids() {
            prop_assert!(!outcome.results.contains_key(qid));
        }
    }

    #[test]
    fn prop_each_query_independent(batch in batch_strategy(), k in 1usize..10) {
        let p = params(1.1, k);
        let expected: Vec<_> = batch
            .iter()
            .map(|(s, d)| fuse(s.clone(), d.clone(), p).ok())
            .collect();

        let (ids, sparse, dense) = split(batch);
        let outcome = BatchCoordinator::new(p)
            .fuse_batch(&ids, sparse, dense)
            .unwrap();

        for (qid, want) in ids.iter().zip(expected) {
            prop_assert_eq!(outcome.results.get(qid).cloned(), want);
        }
    }

    #[test]
    fn prop_schedule_independent(batch in batch_strategy(), threads in 2usize..6) {
        let (ids, sparse, dense) = split(batch);
        let p = params(0.5, 5);
        let sequential = BatchCoordinator::new(p)
            .fuse_batch(&ids, sparse.clone(), dense.clone())
            .unwrap();
        let pooled = BatchCoordinator::new(p)
            .with_concurrency(Concurrency::Pool { threads })
            .fuse_batch(&ids, sparse, dense)
            .unwrap();
        prop_assert_eq!(sequential, pooled);
    }
}
