pub mod cache;
pub mod envelope;
pub mod match_summary;
pub mod stats;
