use fnv::FnvHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Session-wide memory pressure signal.
///
/// Each `signal` bumps a generation counter; caches compare it against the
/// generation they last saw, so every cache observes every signal exactly once.
#[derive(Debug, Clone, Default)]
pub struct MemoryPressure {
    generation: Arc<AtomicU64>,
    cleared: Arc<AtomicU64>,
}

impl MemoryPressure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) {
        self.generation.fetch_add(1, Ordering::Release);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Non-empty caches dropped in response to a signal, across all workers.
    pub fn caches_cleared(&self) -> u64 {
        self.cleared.load(Ordering::Relaxed)
    }

    fn record_clear(&self) {
        self.cleared.fetch_add(1, Ordering::Relaxed);
    }
}

/// Plaintext -> score memo, capped by entry count.
///
/// Distinct keys can decrypt to identical text (`AB` and `ABAB`, for
/// instance), which is where hits come from. A full cache is cleared
/// wholesale rather than evicting entry by entry.
#[derive(Debug)]
pub struct ScoreCache {
    capacity: usize,
    entries: FnvHashMap<String, Option<f64>>,
    seen_generation: u64,
    hits: u64,
    clears: u64,
}

impl ScoreCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: FnvHashMap::default(),
            seen_generation: 0,
            hits: 0,
            clears: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn clears(&self) -> u64 {
        self.clears
    }

    pub fn get(&mut self, text: &str) -> Option<Option<f64>> {
        let found = self.entries.get(text).copied();
        if found.is_some() {
            self.hits += 1;
        }
        found
    }

    pub fn insert(&mut self, text: &str, score: Option<f64>) {
        if !self.is_enabled() {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.clear();
        }
        self.entries.insert(text.to_owned(), score);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.clears += 1;
    }

    /// Clears the cache if pressure was signalled since the last check.
    pub fn observe(&mut self, pressure: &MemoryPressure) {
        let current = pressure.generation();
        if current != self.seen_generation {
            self.seen_generation = current;
            if !self.entries.is_empty() {
                debug!(
                    "Memory pressure: dropping {} cached scores",
                    self.entries.len()
                );
                self.clear();
                pressure.record_clear();
            }
        }
    }
}
