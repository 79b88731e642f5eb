use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::envelope::Envelope;
use crate::models::match_summary::MatchSummary;
use crate::models::stats::Stats;
use crate::state::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "message": "VLR.GG API is running"}))
}

pub const NO_LIVE_MATCHES: &str = "No live matches currently available.";

/// An empty list (every live row unreadable) carries an explanatory message.
pub async fn live_matches(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<MatchSummary>>>> {
    let data = state
        .stats
        .track("get_live_matches", state.matches.live_matches())
        .await?;
    if data.is_empty() {
        return Ok(Json(Envelope::success_with_message(data, NO_LIVE_MATCHES)));
    }
    Ok(Json(Envelope::success(data)))
}

/// Any failure to resolve the id is reported as 404.
pub async fn match_details(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<Envelope<MatchSummary>>> {
    let lookup = async {
        state.matches.match_by_id(&match_id).await.map_err(|e| match e {
            AppError::NotFound(_) => e,
            other => AppError::NotFound(other.to_string()),
        })
    };
    let data = state.stats.track("get_match_details", lookup).await?;
    Ok(Json(Envelope::success(data)))
}

pub async fn performance_stats(State(state): State<AppState>) -> Json<Stats> {
    Json(state.stats.snapshot())
}

pub async fn reset_stats(State(state): State<AppState>) -> Json<Stats> {
    info!("Resetting performance stats");
    Json(state.stats.reset())
}
