use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Global runtime configuration for the engine.
/// Thread-safe via atomics, can be changed on-the-fly.
#[derive(Debug)]
pub struct GlobalConfig {
    /// ef_search: oracle search depth (higher = more accurate, slower)
    pub ef_search: AtomicUsize,

    /// ef_construction: oracle build quality (higher = better graph, slower indexing)
    pub ef_construction: AtomicUsize,

    /// m: oracle graph degree (layer 0 is kept twice as dense)
    pub m: AtomicUsize,

    /// How many extra approximate neighbors to request per requested result,
    /// so that range post-filtering still leaves enough survivors.
    pub oversample_factor: AtomicUsize,

    /// Router selectivity threshold, stored as f32 bits.
    /// Above it the oracle path runs; at or below it the exact path runs.
    selectivity_threshold: AtomicU32,
}

impl GlobalConfig {
    pub fn new() -> Self {
        Self {
            ef_search: AtomicUsize::new(100),
            ef_construction: AtomicUsize::new(100),
            m: AtomicUsize::new(16),
            oversample_factor: AtomicUsize::new(10),
            selectivity_threshold: AtomicU32::new(0.5f32.to_bits()),
        }
    }

    pub fn get_ef_search(&self) -> usize {
        self.ef_search.load(Ordering::Relaxed)
    }

    pub fn set_ef_search(&self, val: usize) {
        self.ef_search.store(val, Ordering::Relaxed);
    }

    pub fn get_ef_construction(&self) -> usize {
        self.ef_construction.load(Ordering::Relaxed)
    }

    pub fn set_ef_construction(&self, val: usize) {
        self.ef_construction.store(val, Ordering::Relaxed);
    }

    pub fn get_m(&self) -> usize {
        self.m.load(Ordering::Relaxed)
    }

    pub fn set_m(&self, val: usize) {
        self.m.store(val, Ordering::Relaxed);
    }

    pub fn get_oversample_factor(&self) -> usize {
        self.oversample_factor.load(Ordering::Relaxed)
    }

    pub fn set_oversample_factor(&self, val: usize) {
        self.oversample_factor.store(val, Ordering::Relaxed);
    }

    pub fn get_selectivity_threshold(&self) -> f32 {
        f32::from_bits(self.selectivity_threshold.load(Ordering::Relaxed))
    }

    pub fn set_selectivity_threshold(&self, val: f32) {
        self.selectivity_threshold
            .store(val.to_bits(), Ordering::Relaxed);
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self::new()
    }
}
