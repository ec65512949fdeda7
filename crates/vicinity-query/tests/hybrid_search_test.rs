//! End-to-end routing over a real graph oracle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use vicinity_core::{Dataset, GlobalConfig, NeighborOracle, RangeQuery, VectorRecord};
use vicinity_index::RangeIndex;
use vicinity_oracle::HnswOracle;
use vicinity_query::{ExactScorer, QueryRouter, SearchStrategy};

const DIM: usize = 8;
const N: usize = 200;

fn build_engine(config: &Arc<GlobalConfig>) -> (Dataset, RangeIndex, HnswOracle) {
    let mut rng = StdRng::seed_from_u64(42);
    let records: Vec<VectorRecord> = (0..N as u32)
        .map(|i| VectorRecord {
            id: i,
            filter_attr: rng.gen_range(0.0..1.0),
            embedding: (0..DIM).map(|_| rng.gen_range(-1.0..1.0)).collect(),
        })
        .collect();
    let dataset = Dataset::from_records(DIM, records).unwrap();

    let mut index = RangeIndex::new(8);
    let mut oracle = HnswOracle::new(DIM, Arc::clone(config));
    for rec in dataset.records() {
        index.insert(rec.filter_attr, rec.id);
        oracle.add_point(&rec.embedding, rec.id);
    }
    index.check_invariants();
    (dataset, index, oracle)
}

#[test]
fn loose_filter_returns_k_in_range_results() {
    let config = Arc::new(GlobalConfig::new());
    config.set_ef_construction(200);
    config.set_ef_search(200);
    config.set_selectivity_threshold(0.2);

    let (dataset, index, oracle) = build_engine(&config);
    let router = QueryRouter::new(&dataset, &index, &oracle, Arc::clone(&config));

    let mut rng = StdRng::seed_from_u64(1);
    let query = RangeQuery {
        lower: 0.0,
        upper: 1.0,
        embedding: (0..DIM).map(|_| rng.gen_range(-1.0..1.0)).collect(),
    };

    let routed = router.search_routed(&query, 5).unwrap();
    // The whole dataset qualifies; either the oracle delivered or the
    // fallback did, and both must produce k in-range ranked results.
    assert_eq!(routed.results.len(), 5);
    assert!(routed
        .results
        .iter()
        .all(|&(id, _)| query.contains(dataset.filter_attr(id))));
    assert!(routed.results.windows(2).all(|w| w[0].1 <= w[1].1));
    assert!((routed.selectivity - 1.0).abs() < f32::EPSILON);
}

#[test]
fn tight_filter_is_scored_exactly() {
    let config = Arc::new(GlobalConfig::new());
    config.set_selectivity_threshold(0.5);

    let (dataset, index, oracle) = build_engine(&config);
    let router = QueryRouter::new(&dataset, &index, &oracle, Arc::clone(&config));

    let mut rng = StdRng::seed_from_u64(2);
    let query = RangeQuery {
        lower: 0.4,
        upper: 0.45,
        embedding: (0..DIM).map(|_| rng.gen_range(-1.0..1.0)).collect(),
    };

    let routed = router.search_routed(&query, 5).unwrap();
    assert_eq!(routed.strategy, SearchStrategy::Exact);

    let candidates = index.range_search(query.lower, query.upper);
    let expected = ExactScorer::new(&dataset)
        .top_k(5, &candidates, &query.embedding)
        .unwrap();
    assert_eq!(routed.results, expected);
}

#[test]
fn every_exact_strategy_result_matches_ground_truth() {
    let config = Arc::new(GlobalConfig::new());
    config.set_ef_construction(120);
    config.set_ef_search(120);
    config.set_selectivity_threshold(0.4);

    let (dataset, index, oracle) = build_engine(&config);
    let router = QueryRouter::new(&dataset, &index, &oracle, Arc::clone(&config));
    let scorer = ExactScorer::new(&dataset);

    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..20 {
        let lo = rng.gen_range(0.0f32..0.8);
        let hi = lo + rng.gen_range(0.0f32..0.4);
        let query = RangeQuery {
            lower: lo,
            upper: hi,
            embedding: (0..DIM).map(|_| rng.gen_range(-1.0..1.0)).collect(),
        };

        let routed = router.search_routed(&query, 10).unwrap();
        let candidates = index.range_search(lo, hi);
        assert!(routed
            .results
            .iter()
            .all(|&(id, _)| query.contains(dataset.filter_attr(id))));

        // The approximate path may legitimately differ; both exact paths
        // must agree with direct scoring.
        if routed.strategy != SearchStrategy::Approximate {
            let expected = scorer.top_k(10, &candidates, &query.embedding).unwrap();
            assert_eq!(routed.results, expected);
        }
    }
}
