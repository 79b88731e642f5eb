pub mod extractor;
pub mod match_service;
pub mod stats;
