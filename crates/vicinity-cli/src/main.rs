mod dataset;
mod metrics;

use clap::Parser;
use rand::Rng;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use vicinity_core::{Dataset, GlobalConfig, NeighborOracle, RangeQuery, VectorRecord, VicinityError};
use vicinity_index::RangeIndex;
use vicinity_oracle::HnswOracle;
use vicinity_query::{ExactScorer, QueryRouter, SearchStrategy};

#[derive(Parser, Debug)]
#[command(
    name = "vicinity",
    about = "Range-filtered approximate nearest-neighbor query engine"
)]
struct Args {
    /// Binary vector file: u32 LE row count, then rows of f32 LE values
    #[arg(long)]
    data: Option<PathBuf>,

    /// Binary query file in the same layout
    #[arg(long)]
    queries: Option<PathBuf>,

    /// On-disk data row width (categorical + filter attribute + embedding)
    #[arg(long, default_value_t = 102)]
    data_dim: usize,

    /// On-disk query row width (tag + categorical + bounds + embedding)
    #[arg(long, default_value_t = 104)]
    query_dim: usize,

    /// Neighbors to return per query
    #[arg(short, long, default_value_t = 10)]
    k: usize,

    /// Tree order d: index nodes hold at most 2d keys
    #[arg(long, default_value_t = 64)]
    order: usize,

    /// Selectivity above which the oracle path runs
    #[arg(long, default_value_t = 0.5)]
    threshold: f32,

    /// Approximate neighbors requested per needed result
    #[arg(long, default_value_t = 10)]
    oversample: usize,

    /// Synthetic dataset size when --data is absent
    #[arg(long, default_value_t = 10_000)]
    synth_vectors: usize,

    /// Synthetic query count when --queries is absent
    #[arg(long, default_value_t = 200)]
    synth_queries: usize,

    /// Embedding width for synthetic data
    #[arg(long, default_value_t = 32)]
    synth_dim: usize,

    /// Emit the metrics block as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Print the index structure after the build
    #[arg(long)]
    dump_tree: bool,
}

fn synthetic_dataset(n: usize, dim: usize) -> Dataset {
    let mut rng = rand::thread_rng();
    let records = (0..n as u32)
        .map(|i| VectorRecord {
            id: i,
            filter_attr: rng.gen_range(0.0..1.0),
            embedding: (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect(),
        })
        .collect();
    Dataset::from_records(dim, records).expect("synthetic records are well formed")
}

fn synthetic_queries(n: usize, dim: usize) -> Vec<RangeQuery> {
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|_| {
            let lower = rng.gen_range(0.0f32..0.9);
            let width = rng.gen_range(0.01f32..0.6);
            RangeQuery {
                lower,
                upper: (lower + width).min(1.0),
                embedding: (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect(),
            }
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vicinity_cli=info,vicinity_query=info".into()),
        )
        .init();

    let args = Args::parse();

    // 1. Load (or synthesize) the dataset and query batch.
    let dataset = match &args.data {
        Some(path) => {
            println!("📂 Loading vectors: {}", path.display());
            dataset::load_dataset(path, args.data_dim)?
        }
        None => {
            println!(
                "🧪 No --data given, generating {} random vectors (dim {})",
                args.synth_vectors, args.synth_dim
            );
            synthetic_dataset(args.synth_vectors, args.synth_dim)
        }
    };
    if dataset.is_empty() {
        return Err(Box::new(VicinityError::MalformedInput(
            "dataset is empty".into(),
        )));
    }
    println!("   {} vectors, embedding dim {}", dataset.len(), dataset.dim());

    let queries = match &args.queries {
        Some(path) => {
            println!("📂 Loading queries: {}", path.display());
            dataset::load_queries(path, args.query_dim)?
        }
        None => synthetic_queries(args.synth_queries, dataset.dim()),
    };
    println!("   {} range-filtered queries", queries.len());

    let config = Arc::new(GlobalConfig::new());
    config.set_selectivity_threshold(args.threshold);
    config.set_oversample_factor(args.oversample);

    // 2. Sequential build: every record goes through the index and the oracle.
    println!("🌳 Building range index (order {})...", args.order);
    let start = Instant::now();
    let mut index = RangeIndex::new(args.order);
    for rec in dataset.records() {
        index.insert(rec.filter_attr, rec.id);
    }
    let index_build = start.elapsed();
    println!(
        "   ✓ {} keys in {:.3}s ({:.0} inserts/s), height {}",
        index.len(),
        index_build.as_secs_f64(),
        index.len() as f64 / index_build.as_secs_f64(),
        index.height()
    );

    let sorted = {
        let keys = index.traverse_leaves();
        keys.windows(2).all(|w| w[0] <= w[1])
    };
    println!("   Keys are {}", if sorted { "sorted ✅" } else { "NOT sorted ❌" });

    if args.dump_tree {
        print!("{}", index.dump());
    }

    println!("🕸️ Building neighbor graph...");
    let start = Instant::now();
    let mut oracle = HnswOracle::new(dataset.dim(), Arc::clone(&config));
    for rec in dataset.records() {
        oracle.add_point(&rec.embedding, rec.id);
    }
    let graph_build = start.elapsed();
    println!(
        "   ✓ {} points in {:.3}s ({:.0} inserts/s)",
        oracle.len(),
        graph_build.as_secs_f64(),
        oracle.len() as f64 / graph_build.as_secs_f64()
    );

    if queries.is_empty() {
        println!("No queries to run.");
        return Ok(());
    }

    // 3. Query phase: the built engine is read-only, so queries fan out
    //    across the thread pool with no locking.
    println!("🔍 Running {} queries (k = {})...", queries.len(), args.k);
    let router = QueryRouter::new(&dataset, &index, &oracle, Arc::clone(&config));
    let scorer = ExactScorer::new(&dataset);

    let outcomes: Result<Vec<_>, VicinityError> = queries
        .par_iter()
        .map(|query| {
            let start = Instant::now();
            let routed = router.search_routed(query, args.k)?;
            let elapsed = start.elapsed().as_secs_f64();

            // Ground truth for recall, outside the timed section.
            let candidates = index.range_search(query.lower, query.upper);
            let exact = scorer.top_k(args.k, &candidates, &query.embedding)?;
            let recall = if exact.is_empty() {
                1.0
            } else {
                let hits = routed
                    .results
                    .iter()
                    .filter(|(id, _)| exact.iter().any(|(eid, _)| eid == id))
                    .count();
                hits as f64 / exact.len() as f64
            };

            Ok((elapsed, recall, routed.strategy))
        })
        .collect();
    let outcomes = outcomes?;

    let times: Vec<f64> = outcomes.iter().map(|o| o.0).collect();
    let recalls: Vec<f64> = outcomes.iter().map(|o| o.1).collect();
    let (mut approx, mut exact, mut fallback) = (0usize, 0usize, 0usize);
    for (_, _, strategy) in &outcomes {
        match strategy {
            SearchStrategy::Approximate => approx += 1,
            SearchStrategy::Exact => exact += 1,
            SearchStrategy::ExactFallback => fallback += 1,
        }
    }
    info!(approx, exact, fallback, "strategy breakdown");
    println!(
        "   Paths: {approx} approximate, {exact} exact, {fallback} fallback"
    );

    let summary = metrics::compute_metrics(&times, &recalls);
    metrics::display_metrics(&summary);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
