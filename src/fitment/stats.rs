// Running counters for product filtering, per match path.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::matcher::{MatchOutcome, MatchPath};

#[derive(Debug, Clone, Serialize)]
pub struct FilterStatsSnapshot {
    pub evaluated: u64,
    pub matched: u64,
    pub structured_evaluated: u64,
    pub free_text_evaluated: u64,
    pub unfiltered: u64,
    pub match_rate: f64,
}

pub struct FilterStats {
    evaluated: AtomicU64,
    matched: AtomicU64,
    structured: AtomicU64,
    free_text: AtomicU64,
    unfiltered: AtomicU64,
}

impl FilterStats {
    pub fn new() -> Self {
        Self {
            evaluated: AtomicU64::new(0),
            matched: AtomicU64::new(0),
            structured: AtomicU64::new(0),
            free_text: AtomicU64::new(0),
            unfiltered: AtomicU64::new(0),
        }
    }

    pub fn record(&self, outcome: MatchOutcome) {
        self.evaluated.fetch_add(1, Ordering::Relaxed);
        if outcome.matched {
            self.matched.fetch_add(1, Ordering::Relaxed);
        }
        let counter = match outcome.path {
            MatchPath::Structured => &self.structured,
            MatchPath::FreeText => &self.free_text,
            MatchPath::EmptySelection => &self.unfiltered,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FilterStatsSnapshot {
        let evaluated = self.evaluated.load(Ordering::Relaxed);
        let matched = self.matched.load(Ordering::Relaxed);
        let match_rate = if evaluated > 0 {
            matched as f64 / evaluated as f64
        } else {
            0.0
        };
        FilterStatsSnapshot {
            evaluated,
            matched,
            structured_evaluated: self.structured.load(Ordering::Relaxed),
            free_text_evaluated: self.free_text.load(Ordering::Relaxed),
            unfiltered: self.unfiltered.load(Ordering::Relaxed),
            match_rate,
        }
    }
}

impl Default for FilterStats {
    fn default() -> Self {
        Self::new()
    }
}
