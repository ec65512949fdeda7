pub mod config;
pub mod record;

pub use config::GlobalConfig;
pub use record::{Dataset, RangeQuery, VectorRecord};

use thiserror::Error;

/// Stable record identifier: the record's position in the loaded dataset.
pub type RecordId = u32;

#[derive(Debug, Error)]
pub enum VicinityError {
    /// The query vector dimension does not match the indexed vectors.
    #[error("dimension mismatch: query has {query} dims, dataset has {indexed}")]
    DimensionMismatch { query: usize, indexed: usize },

    /// A record's embedding does not match the dataset dimension, or its id
    /// does not match its position.
    #[error("record {id}: expected {expected}, got {got}")]
    InvalidRecord {
        id: RecordId,
        expected: usize,
        got: usize,
    },

    /// An input file does not follow the expected binary layout.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Squared Euclidean distance. The square root is omitted on purpose: only
/// the relative ordering of candidates matters anywhere in the engine.
#[inline]
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "embedding dimensions must agree");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Rejects a query vector whose dimension differs from the dataset's before
/// any distance is computed.
#[inline]
pub fn check_dims(query: &[f32], indexed: usize) -> Result<(), VicinityError> {
    if query.len() == indexed {
        Ok(())
    } else {
        Err(VicinityError::DimensionMismatch {
            query: query.len(),
            indexed,
        })
    }
}

/// Approximate ranked-neighbor search over the full unfiltered dataset.
///
/// Results are ranked ascending by distance, at most `m` long, and carry no
/// recall guarantee: the caller is responsible for compensating when too few
/// usable neighbors come back.
pub trait NeighborOracle: Send + Sync {
    /// Registers one embedding under `id`. Called once per record, in
    /// dataset order, strictly sequentially.
    fn add_point(&mut self, embedding: &[f32], id: RecordId);

    /// Returns up to `m` `(id, squared distance)` pairs ranked ascending.
    fn search_approx(&self, query: &[f32], m: usize) -> Vec<(RecordId, f32)>;
}

#[cfg(test)]
mod tests;
