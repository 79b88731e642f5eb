use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{health, live_matches, match_details, performance_stats, reset_stats};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/matches/live", get(live_matches))
        .route("/matches/:match_id", get(match_details))
        .route("/stats/performance", get(performance_stats))
        .route("/stats/reset", post(reset_stats))
        .with_state(state)
}
