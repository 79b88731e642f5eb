use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, UPGRADE_INSECURE_REQUESTS};
use reqwest::{Client, StatusCode, Url};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::config::FetcherConfig;
use crate::error::{AppError, Result};

enum Attempt {
    Body(String),
    RateLimited,
    Status(StatusCode),
}

/// Pooled upstream client with a fixed retry schedule.
///
/// Cloning is cheap; clones share the connection pool and the connection caps.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: Arc<FetcherConfig>,
    pool: Arc<Semaphore>,
    hosts: Arc<Mutex<HashMap<String, Arc<Semaphore>>>>,
}

impl Fetcher {
    pub fn new(config: FetcherConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .pool_max_idle_per_host(config.per_host_limit)
            .pool_idle_timeout(Duration::from_secs(30))
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .timeout(config.total_timeout)
            .build()
            .context("failed to build upstream HTTP client")?;

        Ok(Self {
            client,
            pool: Arc::new(Semaphore::new(config.pool_limit)),
            hosts: Arc::new(Mutex::new(HashMap::new())),
            config: Arc::new(config),
        })
    }

    /// GETs `url` and returns the body of the first 200 response.
    ///
    /// Every failed attempt (non-200, timeout, transport error) is followed by
    /// a `backoff_base * 2^attempt` wait when attempts remain; a 429 waits that
    /// long once more on top. Running out of attempts yields
    /// [`AppError::FetchExhausted`].
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let attempts = self.config.max_retries;

        for attempt in 0..attempts {
            let retries_left = attempt + 1 < attempts;
            debug!("GET {} (attempt {})", url, attempt + 1);

            match self.attempt(url).await {
                Ok(Attempt::Body(text)) => return Ok(text),
                Ok(Attempt::RateLimited) => {
                    let wait = self.backoff(attempt);
                    warn!(
                        "Rate limited, waiting {:?} before retry {}",
                        wait,
                        attempt + 1
                    );
                    if retries_left {
                        sleep(wait).await;
                    }
                }
                Ok(Attempt::Status(status)) => warn!("HTTP {} for {}", status, url),
                Err(e) if e.is_timeout() => {
                    warn!("Timeout on attempt {} for {}", attempt + 1, url)
                }
                Err(e) => warn!("Client error on attempt {}: {}", attempt + 1, e),
            }

            if retries_left {
                sleep(self.backoff(attempt)).await;
            }
        }

        error!("Failed to fetch {} after {} attempts", url, attempts);
        Err(AppError::FetchExhausted {
            url: url.to_string(),
            attempts,
        })
    }

    async fn attempt(&self, url: &str) -> reqwest::Result<Attempt> {
        let _permits = self.acquire(url).await;
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(Attempt::Body(response.text().await?)),
            StatusCode::TOO_MANY_REQUESTS => Ok(Attempt::RateLimited),
            status => Ok(Attempt::Status(status)),
        }
    }

    /// Holds one global slot and one slot for the URL's host.
    async fn acquire(&self, url: &str) -> Option<(OwnedSemaphorePermit, OwnedSemaphorePermit)> {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();

        let per_host = {
            let mut hosts = self.hosts.lock().unwrap_or_else(PoisonError::into_inner);
            hosts
                .entry(host)
                .or_insert_with(|| Arc::new(Semaphore::new(self.config.per_host_limit)))
                .clone()
        };

        let global = self.pool.clone().acquire_owned().await.ok()?;
        let host = per_host.acquire_owned().await.ok()?;
        Some((global, host))
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.config.backoff_base * 2u32.saturating_pow(attempt)
    }
}
