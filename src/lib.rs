pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod web;

use std::sync::Arc;

use crate::api::fetcher::Fetcher;
use crate::config::{Config, FetcherConfig};
use crate::services::stats::StatsTracker;
use crate::state::AppState;

// Re-export commonly used items
pub use services::match_service::MatchService;
pub use models::match_summary::MatchSummary;

pub fn build_state(cfg: &Config, fetcher_config: FetcherConfig) -> anyhow::Result<AppState> {
    let fetcher = Fetcher::new(fetcher_config)?;
    let stats = Arc::new(StatsTracker::new());
    let matches = MatchService::new(fetcher, stats.clone(), cfg.base_url.clone());
    Ok(AppState { matches, stats })
}

pub fn build_app(cfg: &Config) -> anyhow::Result<axum::Router> {
    let state = build_state(cfg, FetcherConfig::default())?;
    Ok(web::router::build_router(state))
}
