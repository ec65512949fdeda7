//! Adaptive hybrid routing.
//!
//! Every query first narrows to the ids whose filter attribute lies in the
//! requested interval. What happens next depends on how much of the dataset
//! survived: a loose filter lets the oracle's globally ranked neighbors
//! through cheap post-filtering, while a tight filter would waste most of
//! the oracle's budget on out-of-range points, so the small candidate set is
//! scored exactly instead. When the oracle under-delivers, the router
//! reroutes the whole query to the exact path rather than re-querying — the
//! exact path over a filtered candidate set is the correctness guarantee.

use std::sync::Arc;
use tracing::debug;

use vicinity_core::{
    check_dims, Dataset, GlobalConfig, NeighborOracle, RangeQuery, RecordId, VicinityError,
};
use vicinity_index::RangeIndex;

use crate::scorer::ExactScorer;

/// Which path produced a query's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Oracle oversampling plus range post-filter (loose filters).
    Approximate,
    /// Exact scoring over the filtered candidates (restrictive filters).
    Exact,
    /// The approximate path under-delivered and the query was rerouted
    /// wholesale to the exact path.
    ExactFallback,
}

/// A routed query result with the decision that produced it.
#[derive(Debug)]
pub struct RoutedSearch {
    pub results: Vec<(RecordId, f32)>,
    pub strategy: SearchStrategy,
    pub selectivity: f32,
}

/// Stateless per-query router over a built index and oracle. Holds only
/// shared references, so one router serves any number of threads.
pub struct QueryRouter<'a, O: NeighborOracle> {
    dataset: &'a Dataset,
    index: &'a RangeIndex,
    oracle: &'a O,
    config: Arc<GlobalConfig>,
}

impl<'a, O: NeighborOracle> QueryRouter<'a, O> {
    pub fn new(
        dataset: &'a Dataset,
        index: &'a RangeIndex,
        oracle: &'a O,
        config: Arc<GlobalConfig>,
    ) -> Self {
        Self {
            dataset,
            index,
            oracle,
            config,
        }
    }

    /// Up to `k` record ids ranked ascending by distance to the query
    /// embedding, all with filter attribute inside `[lower, upper]`.
    pub fn search(&self, query: &RangeQuery, k: usize) -> Result<Vec<(RecordId, f32)>, VicinityError> {
        Ok(self.search_routed(query, k)?.results)
    }

    /// Same as [`search`](Self::search), with the routing decision exposed.
    pub fn search_routed(&self, query: &RangeQuery, k: usize) -> Result<RoutedSearch, VicinityError> {
        check_dims(&query.embedding, self.dataset.dim())?;

        let candidates = self.index.range_search(query.lower, query.upper);
        if candidates.is_empty() {
            return Ok(RoutedSearch {
                results: Vec::new(),
                strategy: SearchStrategy::Exact,
                selectivity: 0.0,
            });
        }

        let selectivity = candidates.len() as f32 / self.dataset.len() as f32;
        let threshold = self.config.get_selectivity_threshold();
        let scorer = ExactScorer::new(self.dataset);

        // At the threshold exactly, the exact path runs; only strictly looser
        // filters take the oracle.
        if selectivity > threshold {
            let oversample = self.config.get_oversample_factor();
            let ranked = self.oracle.search_approx(&query.embedding, k * oversample);

            let mut accepted = Vec::with_capacity(k);
            for (id, dist) in ranked {
                if query.contains(self.dataset.filter_attr(id)) {
                    accepted.push((id, dist));
                    if accepted.len() == k {
                        break;
                    }
                }
            }

            if accepted.len() >= k {
                debug!(
                    selectivity,
                    k, "approximate path satisfied the filter after post-filtering"
                );
                return Ok(RoutedSearch {
                    results: accepted,
                    strategy: SearchStrategy::Approximate,
                    selectivity,
                });
            }

            debug!(
                selectivity,
                survivors = accepted.len(),
                k,
                "oracle under-delivered, rerouting to the exact path"
            );
            let results = scorer.top_k(k, &candidates, &query.embedding)?;
            return Ok(RoutedSearch {
                results,
                strategy: SearchStrategy::ExactFallback,
                selectivity,
            });
        }

        debug!(selectivity, k, "restrictive filter, scoring exactly");
        let results = scorer.top_k(k, &candidates, &query.embedding)?;
        Ok(RoutedSearch {
            results,
            strategy: SearchStrategy::Exact,
            selectivity,
        })
    }
}
