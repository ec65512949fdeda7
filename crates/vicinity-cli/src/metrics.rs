//! Per-batch query metrics: throughput, latency, and recall against exact
//! ground truth.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct QueryMetrics {
    pub qps: f64,
    pub total_runtime: f64,
    pub avg_runtime: f64,
    pub recall: f64,
    pub total_queries: usize,
}

/// `query_times` are per-query seconds; `recalls` are per-query fractions of
/// the exact top-k recovered.
pub fn compute_metrics(query_times: &[f64], recalls: &[f64]) -> QueryMetrics {
    let total: f64 = query_times.iter().sum();
    let n = query_times.len();

    QueryMetrics {
        qps: if total > 0.0 { n as f64 / total } else { 0.0 },
        total_runtime: total,
        avg_runtime: if n > 0 { total / n as f64 } else { 0.0 },
        recall: if recalls.is_empty() {
            0.0
        } else {
            recalls.iter().sum::<f64>() / recalls.len() as f64
        },
        total_queries: n,
    }
}

pub fn display_metrics(metrics: &QueryMetrics) {
    println!("\n=== Performance Metrics ===");
    println!("Queries Per Second (QPS): {:.2}", metrics.qps);
    println!("Total Runtime: {:.4} s", metrics.total_runtime);
    println!("Average Runtime: {:.6} s", metrics.avg_runtime);
    println!("Recall: {:.2}%", metrics.recall * 100.0);
    println!("Total Queries: {}", metrics.total_queries);
    println!("========================\n");
}
