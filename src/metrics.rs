//! Metrics sink contract (spec §6 `Metrics`).
//!
//! Grounded on the teacher's `AdapterMetrics`
//! (`services_v2/adapters/src/metrics.rs`): plain atomics for counters, a
//! `DashMap` for per-key series, a trait boundary so the host can swap in a
//! real `prometheus`/`metrics` exporter without this crate depending on one.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Candidate,
    Ranked,
}

pub trait RouterMetrics: Send + Sync {
    fn cache_hit(&self, kind: CacheKind) {
        let _ = kind;
    }
    fn cache_miss(&self, kind: CacheKind) {
        let _ = kind;
    }
    fn cache_write(&self, kind: CacheKind) {
        let _ = kind;
    }
    fn quote_latency(&self, latency: Duration) {
        let _ = latency;
    }
    fn routes_found(&self, count: usize) {
        let _ = count;
    }
}

/// No-op sink, the default when a host does not care to wire metrics up.
#[derive(Debug, Default)]
pub struct NoopMetrics;

impl RouterMetrics for NoopMetrics {}

/// In-process counters, useful for tests and for hosts that just want to
/// expose a debug endpoint without pulling in a metrics exporter crate.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    cache_hits: DashMap<CacheKind, AtomicU64>,
    cache_misses: DashMap<CacheKind, AtomicU64>,
    cache_writes: DashMap<CacheKind, AtomicU64>,
    routes_found_total: AtomicU64,
    quotes_total: AtomicU64,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_hit_count(&self, kind: CacheKind) -> u64 {
        self.cache_hits.get(&kind).map(|c| c.load(Ordering::Relaxed)).unwrap_or(0)
    }

    pub fn cache_miss_count(&self, kind: CacheKind) -> u64 {
        self.cache_misses.get(&kind).map(|c| c.load(Ordering::Relaxed)).unwrap_or(0)
    }

    pub fn quotes_served(&self) -> u64 {
        self.quotes_total.load(Ordering::Relaxed)
    }
}

impl RouterMetrics for InMemoryMetrics {
    fn cache_hit(&self, kind: CacheKind) {
        self.cache_hits.entry(kind).or_insert_with(|| AtomicU64::new(0)).fetch_add(1, Ordering::Relaxed);
    }

    fn cache_miss(&self, kind: CacheKind) {
        self.cache_misses.entry(kind).or_insert_with(|| AtomicU64::new(0)).fetch_add(1, Ordering::Relaxed);
    }

    fn cache_write(&self, kind: CacheKind) {
        self.cache_writes.entry(kind).or_insert_with(|| AtomicU64::new(0)).fetch_add(1, Ordering::Relaxed);
    }

    fn quote_latency(&self, _latency: Duration) {
        self.quotes_total.fetch_add(1, Ordering::Relaxed);
    }

    fn routes_found(&self, count: usize) {
        self.routes_found_total.fetch_add(count as u64, Ordering::Relaxed);
    }
}
