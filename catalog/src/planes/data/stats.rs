use serde::Serialize;
use shared::Error;
use std::sync::atomic::{AtomicU64, Ordering};

/// Advisory counters for cache hits, misses and terminal outcomes.
/// Nothing reads these to make decisions.
#[derive(Debug, Default)]
pub struct AccessStats {
    hits: AtomicU64,
    misses: AtomicU64,
    not_found: AtomicU64,
    transient: AtomicU64,
    validation: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AccessStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub not_found: u64,
    pub transient: u64,
    pub validation: u64,
}

impl AccessStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self, error: &Error) {
        let counter = match error {
            Error::NotFound(_) => &self.not_found,
            Error::Validation(_) => &self.validation,
            Error::Transient(_) | Error::Internal(_) => &self.transient,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> AccessStatsSnapshot {
        AccessStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            transient: self.transient.load(Ordering::Relaxed),
            validation: self.validation.load(Ordering::Relaxed),
        }
    }
}
