use crate::{RecordId, VicinityError};

/// One stored vector: a scalar filter attribute plus a fixed-dimension
/// embedding. Immutable once loaded; everything downstream refers to it by id.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: RecordId,
    pub filter_attr: f32,
    pub embedding: Vec<f32>,
}

/// The fully materialized dataset, owner of all records.
/// Ids are positions: `records[i].id == i`.
#[derive(Debug)]
pub struct Dataset {
    dim: usize,
    records: Vec<VectorRecord>,
}

impl Dataset {
    pub fn from_records(dim: usize, records: Vec<VectorRecord>) -> Result<Self, VicinityError> {
        for (i, rec) in records.iter().enumerate() {
            if rec.id as usize != i {
                return Err(VicinityError::InvalidRecord {
                    id: rec.id,
                    expected: i,
                    got: rec.id as usize,
                });
            }
            if rec.embedding.len() != dim {
                return Err(VicinityError::InvalidRecord {
                    id: rec.id,
                    expected: dim,
                    got: rec.embedding.len(),
                });
            }
        }
        Ok(Self { dim, records })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[VectorRecord] {
        &self.records
    }

    /// Panics on an unknown id: ids come from indexes built over this same
    /// dataset, so an out-of-range id is a programming defect.
    pub fn embedding(&self, id: RecordId) -> &[f32] {
        &self.records[id as usize].embedding
    }

    pub fn filter_attr(&self, id: RecordId) -> f32 {
        self.records[id as usize].filter_attr
    }
}

/// A range-filtered query: keep only records whose filter attribute lies in
/// `[lower, upper]`, rank the survivors by distance to `embedding`.
#[derive(Debug, Clone)]
pub struct RangeQuery {
    pub lower: f32,
    pub upper: f32,
    pub embedding: Vec<f32>,
}

impl RangeQuery {
    /// Inclusive on both bounds.
    pub fn contains(&self, attr: f32) -> bool {
        attr >= self.lower && attr <= self.upper
    }
}
