use std::sync::Arc;

use crate::services::match_service::MatchService;
use crate::services::stats::StatsTracker;

#[derive(Clone)]
pub struct AppState {
    pub matches: MatchService,
    pub stats: Arc<StatsTracker>,
}
