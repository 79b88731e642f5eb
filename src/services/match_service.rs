use std::sync::Arc;

use anyhow::Context;
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::api::fetcher::Fetcher;
use crate::error::{AppError, ExtractError, Result};
use crate::models::cache::{Cache, LIVE_MATCHES_KEY, LIVE_MATCHES_TTL};
use crate::models::match_summary::MatchSummary;
use crate::services::extractor::{self, Listing};
use crate::services::stats::StatsTracker;

/// Builds the live match list and answers single-match lookups.
#[derive(Clone)]
pub struct MatchService {
    fetcher: Fetcher,
    cache: Arc<Cache<Vec<MatchSummary>>>,
    stats: Arc<StatsTracker>,
    base_url: String,
}

impl MatchService {
    pub fn new(fetcher: Fetcher, stats: Arc<StatsTracker>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            cache: Arc::new(Cache::new(LIVE_MATCHES_TTL)),
            stats,
            base_url: base_url.into(),
        }
    }

    /// Live matches from the home page, each enriched from its match page.
    ///
    /// Served from the cache while the last result is fresh. A failed home
    /// page fetch is returned as an error and not cached; rows that fail to
    /// parse are dropped, and a failed match page fetch keeps the row with its
    /// default logos and map.
    pub async fn live_matches(&self) -> Result<Vec<MatchSummary>> {
        if let Some(cached) = self.cache.get(LIVE_MATCHES_KEY) {
            self.stats.record_cache_hit();
            return Ok(cached);
        }
        self.stats.record_cache_miss();

        let html = self.fetcher.fetch(&self.base_url).await?;
        let base_url = self.base_url.clone();
        let listing =
            tokio::task::spawn_blocking(move || extractor::parse_listing(&html, &base_url))
                .await
                .context("listing parser task failed")?;

        let matches = match listing {
            Listing::NoLiveMatches => {
                info!("No live matches on {}", self.base_url);
                vec![MatchSummary::no_live_sentinel()]
            }
            Listing::Live(rows) => self.enrich(rows).await,
        };

        self.cache.put(LIVE_MATCHES_KEY, matches.clone());
        Ok(matches)
    }

    async fn enrich(&self, rows: Vec<Result<MatchSummary, ExtractError>>) -> Vec<MatchSummary> {
        let tasks: Vec<_> = rows
            .into_iter()
            .filter_map(|row| match row {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!("Error processing live match: {}", e);
                    None
                }
            })
            .map(|summary| tokio::spawn(with_detail(self.fetcher.clone(), summary)))
            .collect();

        let mut matches: Vec<MatchSummary> = join_all(tasks)
            .await
            .into_iter()
            .filter_map(|task| match task {
                Ok(summary) => Some(summary),
                Err(e) => {
                    error!("Live match task failed: {}", e);
                    None
                }
            })
            .collect();

        extractor::annotate_scores(&mut matches);
        debug!("Assembled {} live matches", matches.len());
        matches
    }

    /// Looks `match_id` up in the live list first, then on its own page.
    pub async fn match_by_id(&self, match_id: &str) -> Result<MatchSummary> {
        match self.live_matches().await {
            Ok(matches) => {
                if let Some(found) = matches
                    .into_iter()
                    .find(|m| !m.match_page.is_empty() && m.match_page.contains(match_id))
                {
                    return Ok(found);
                }
            }
            Err(e) => debug!("Live list unavailable for lookup of {}: {}", match_id, e),
        }

        let url = extractor::absolute_url(&self.base_url, match_id);
        let html = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|_| AppError::NotFound(format!("Match {} not found", match_id)))?;
        Ok(extractor::parse_match_page(&html, &url))
    }
}

async fn with_detail(fetcher: Fetcher, mut summary: MatchSummary) -> MatchSummary {
    match fetcher.fetch(&summary.match_page).await {
        Ok(html) => extractor::parse_detail(&html).apply_to(&mut summary),
        Err(e) => warn!(
            "Failed to fetch additional details for {}: {}",
            summary.match_page, e
        ),
    }
    summary
}
