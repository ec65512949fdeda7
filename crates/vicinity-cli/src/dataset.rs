//! Readers for the contest-style binary layout: a `u32` (LE) row count
//! followed by that many rows of `dim` `f32` (LE) values.
//!
//! Data rows carry `[categorical, filter_attr, embedding...]`; the
//! categorical attribute is stripped at load. Query rows carry
//! `[type_tag, categorical, lower, upper, embedding...]`; only tags that
//! mark an active range filter are kept, the rest are dropped here.

use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use vicinity_core::{Dataset, RangeQuery, RecordId, VectorRecord, VicinityError};

/// Leading non-embedding values in a data row.
const DATA_PREFIX: usize = 2;
/// Leading non-embedding values in a query row.
const QUERY_PREFIX: usize = 4;

fn read_rows(path: &Path, dim: usize) -> Result<Vec<Vec<f32>>, VicinityError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let count = reader.read_u32::<LittleEndian>()? as usize;
    let mut rows = Vec::with_capacity(count);
    for _ in 0..count {
        let mut row = vec![0.0f32; dim];
        reader.read_f32_into::<LittleEndian>(&mut row)?;
        rows.push(row);
    }
    Ok(rows)
}

/// Loads the vector file. `raw_dim` is the on-disk row width including the
/// categorical and filter columns.
pub fn load_dataset(path: &Path, raw_dim: usize) -> Result<Dataset, VicinityError> {
    if raw_dim <= DATA_PREFIX {
        return Err(VicinityError::MalformedInput(format!(
            "data rows of width {raw_dim} leave no embedding"
        )));
    }

    let rows = read_rows(path, raw_dim)?;
    let records = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| VectorRecord {
            id: i as RecordId,
            filter_attr: row[1],
            embedding: row[DATA_PREFIX..].to_vec(),
        })
        .collect();
    Dataset::from_records(raw_dim - DATA_PREFIX, records)
}

/// Loads the query file, keeping only range-filtered queries (tags 2 and 3).
/// The tag-3 categorical predicate is ignored.
pub fn load_queries(path: &Path, raw_dim: usize) -> Result<Vec<RangeQuery>, VicinityError> {
    if raw_dim <= QUERY_PREFIX {
        return Err(VicinityError::MalformedInput(format!(
            "query rows of width {raw_dim} leave no embedding"
        )));
    }

    let rows = read_rows(path, raw_dim)?;
    let queries = rows
        .into_iter()
        .filter(|row| {
            let tag = row[0];
            tag == 2.0 || tag == 3.0
        })
        .map(|row| RangeQuery {
            lower: row[2],
            upper: row[3],
            embedding: row[QUERY_PREFIX..].to_vec(),
        })
        .collect();
    Ok(queries)
}
