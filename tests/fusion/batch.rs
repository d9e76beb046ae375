//! Batch coordination through the public API.

use std::collections::HashMap;

use crate::common::{by_qid, params, ranked};
use hybridrank::{
    fuse, BatchCoordinator, Concurrency, FusionError, QueryFailure, RankedList, Side,
};

/// `n` queries with overlapping lists whose scores depend on the query id.
fn synthetic_batch(n: u64) -> (Vec<u64>, HashMap<u64, RankedList>, HashMap<u64, RankedList>) {
    let ids: Vec<u64> = (0..n).collect();
    let mut sparse = HashMap::new();
    let mut dense = HashMap::new();
    for &qid in &ids {
        let base = qid as f32;
        let s: Vec<(String, f32)> = (0..20)
            .map(|i| (format!("doc{}", i), base + i as f32 * 0.5))
            .collect();
        let d: Vec<(String, f32)> = (10..30)
            .map(|i| (format!("doc{}", i), 1.0 / (i as f32 + base)))
            .collect();
        sparse.insert(qid, RankedList::from_pairs(s).unwrap());
        dense.insert(qid, RankedList::from_pairs(d).unwrap());
    }
    (ids, sparse, dense)
}

#[test]
fn empty_list_fails_only_its_query() {
    let sparse = by_qid(vec![
        ("q1".to_string(), ranked(&[("d1", 2.0)])),
        ("q2".to_string(), ranked(&[("d2", 3.0)])),
        ("q3".to_string(), ranked(&[("d3", 4.0)])),
    ]);
    let dense = by_qid(vec![
        ("q1".to_string(), ranked(&[("d1", 1.0)])),
        ("q2".to_string(), RankedList::new()),
        ("q3".to_string(), ranked(&[("d9", 1.0)])),
    ]);
    let ids = vec!["q1".to_string(), "q2".to_string(), "q3".to_string()];

    let outcome = BatchCoordinator::new(params(1.0, 10))
        .fuse_batch(&ids, sparse, dense)
        .unwrap();

    assert_eq!(
        outcome.failures,
        vec![QueryFailure {
            qid: "q2".to_string(),
            error: FusionError::EmptyRankedList { side: Side::Dense },
        }]
    );
    assert_eq!(
        outcome.results.keys().collect::<Vec<_>>(),
        vec!["q1", "q3"]
    );
    assert_eq!(outcome.results["q1"].score_of("d1"), Some(5.0));
}

#[test]
fn batch_matches_single_query_fusion() {
    let (ids, sparse, dense) = synthetic_batch(8);
    let p = params(1.1, 15);
    let expected: Vec<RankedList> = ids
        .iter()
        .map(|q| fuse(sparse[q].clone(), dense[q].clone(), p).unwrap())
        .collect();

    let outcome = BatchCoordinator::new(p)
        .fuse_batch(&ids, sparse, dense)
        .unwrap();

    let got: Vec<RankedList> = outcome.results.into_values().collect();
    assert_eq!(got, expected);
}

#[test]
fn pool_and_sequential_agree_on_large_batch() {
    let (ids, sparse, dense) = synthetic_batch(200);
    let p = params(0.7, 12);

    let sequential = BatchCoordinator::new(p)
        .with_concurrency(Concurrency::Sequential)
        .fuse_batch(&ids, sparse.clone(), dense.clone())
        .unwrap();
    let pooled = BatchCoordinator::new(p)
        .with_concurrency(Concurrency::Pool { threads: 4 })
        .fuse_batch(&ids, sparse, dense)
        .unwrap();

    assert!(sequential.is_complete());
    assert_eq!(sequential, pooled);
}

#[test]
fn results_follow_query_id_order() {
    let (_, sparse, dense) = synthetic_batch(5);
    let outcome = BatchCoordinator::new(params(1.0, 3))
        .with_concurrency(Concurrency::Pool { threads: 2 })
        .fuse_batch(&[4, 0, 3, 1, 2], sparse, dense)
        .unwrap();
    assert_eq!(
        outcome.results.keys().copied().collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4]
    );
}

#[test]
fn unrequested_ids_are_ignored() {
    let (_, sparse, dense) = synthetic_batch(4);
    let outcome = BatchCoordinator::new(params(1.0, 3))
        .fuse_batch(&[1], sparse, dense)
        .unwrap();
    assert_eq!(outcome.results.len(), 1);
    assert!(outcome.results.contains_key(&1));
}

#[test]
fn query_without_any_results_reports_sparse_first() {
    let outcome = BatchCoordinator::new(params(1.0, 3))
        .fuse_batch(&[7u64], HashMap::new(), HashMap::new())
        .unwrap();
    assert_eq!(
        outcome.failures[0].error,
        FusionError::MissingRetrievalResult { side: Side::Sparse }
    );
}
