use serde::{Deserialize, Serialize};

/// Request counters for the tracked endpoints.
///
/// `average_response_time` is in seconds and averages successful requests only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time: f64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}
