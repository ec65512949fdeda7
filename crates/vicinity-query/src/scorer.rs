//! Exact top-k selection by squared Euclidean distance over an explicit
//! candidate set. Brute force on purpose: the router only sends it candidate
//! sets small enough that scanning them beats any index.

use ordered_float::OrderedFloat;
use std::collections::BinaryHeap;

use vicinity_core::{check_dims, squared_euclidean, Dataset, RecordId, VicinityError};

pub struct ExactScorer<'a> {
    dataset: &'a Dataset,
}

impl<'a> ExactScorer<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// The k candidates nearest to `query`, ascending by distance; equal
    /// distances order by ascending id so results are reproducible. Fewer
    /// than k candidates come back whole (not an error), in the same order.
    ///
    /// A bounded max-heap keyed by `(distance, id)` holds the best k seen;
    /// once full, anything at or beyond the current worst is skipped.
    pub fn top_k(
        &self,
        k: usize,
        candidates: &[RecordId],
        query: &[f32],
    ) -> Result<Vec<(RecordId, f32)>, VicinityError> {
        check_dims(query, self.dataset.dim())?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut heap: BinaryHeap<(OrderedFloat<f32>, RecordId)> =
            BinaryHeap::with_capacity(k + 1);

        for &id in candidates {
            let dist = squared_euclidean(self.dataset.embedding(id), query);
            let entry = (OrderedFloat(dist), id);

            if heap.len() >= k {
                match heap.peek() {
                    Some(&worst) if entry >= worst => continue,
                    _ => {}
                }
            }
            heap.push(entry);
            if heap.len() > k {
                heap.pop();
            }
        }

        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|(dist, id)| (id, dist.into_inner()))
            .collect())
    }
}
