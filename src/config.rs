use std::time::Duration;

use serde::Deserialize;

pub const VLR_BASE_URL: &str = "https://www.vlr.gg";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3001 }
fn default_base_url() -> String { VLR_BASE_URL.to_string() }

impl Default for Config {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), base_url: default_base_url() }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
        let port = match std::env::var("PORT") {
            Ok(v) => v.parse()?,
            Err(_) => default_port(),
        };
        let base_url = std::env::var("VLR_BASE_URL").unwrap_or_else(|_| default_base_url());
        Ok(Self { host, port, base_url })
    }
}

/// Upstream client settings. The defaults are the service's fixed limits.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub max_retries: u32,
    /// Wait before retry `n` (0-based) is `backoff_base * 2^n`.
    pub backoff_base: Duration,
    pub pool_limit: usize,
    pub per_host_limit: usize,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub total_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
            pool_limit: 100,
            per_host_limit: 30,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
            total_timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:52.0) Gecko/20100101 Firefox/52.0"
                .to_string(),
        }
    }
}
