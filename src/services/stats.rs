use std::fmt::Display;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;
use tracing::{error, info};

use crate::models::stats::Stats;

/// Process-wide request statistics, shared through `AppState`.
#[derive(Default)]
pub struct StatsTracker {
    stats: Mutex<Stats>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `operation`, counting it and timing it if it succeeds.
    /// The result is handed back unchanged.
    pub async fn track<F, T, E>(&self, name: &str, operation: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.lock().total_requests += 1;
        let start = Instant::now();

        let result = operation.await;
        let elapsed = start.elapsed().as_secs_f64();

        let mut stats = self.lock();
        match &result {
            Ok(_) => {
                stats.successful_requests += 1;
                let n = stats.successful_requests as f64;
                stats.average_response_time =
                    (stats.average_response_time * (n - 1.0) + elapsed) / n;
                info!("{} executed in {:.3}s", name, elapsed);
            }
            Err(e) => {
                stats.failed_requests += 1;
                error!("{} failed after {:.3}s: {}", name, elapsed, e);
            }
        }
        result
    }

    pub fn record_cache_hit(&self) {
        self.lock().cache_hits += 1;
    }

    pub fn record_cache_miss(&self) {
        self.lock().cache_misses += 1;
    }

    pub fn snapshot(&self) -> Stats {
        self.lock().clone()
    }

    pub fn reset(&self) -> Stats {
        let mut stats = self.lock();
        *stats = Stats::default();
        stats.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Stats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
