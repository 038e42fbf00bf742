//! Crawler configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::extract::GITHUB_BASE_URL;
use crate::{CrawlError, FetchConfig, ProxyPool, Result, SearchCategory};

/// Settings for one crawl session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Search keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Raw proxy specs (`host:port` or `user:pass@host:port`).
    #[serde(default)]
    pub proxies: Vec<String>,
    /// Search category.
    #[serde(default, rename = "type")]
    pub category: SearchCategory,
    /// Whether to enrich repository results.
    #[serde(default = "default_extract_extra")]
    pub extract_extra: bool,
    /// Number of proxies raced per request.
    #[serde(default = "default_max_proxy_race")]
    pub max_proxy_race: usize,
    /// Maximum concurrent enrichment fetches.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Timeout for proxied attempts in seconds.
    #[serde(default = "default_proxy_timeout")]
    pub proxy_timeout_secs: u64,
    /// Timeout for direct attempts in seconds.
    #[serde(default = "default_direct_timeout")]
    pub direct_timeout_secs: u64,
    /// Directory receiving CSV output.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// GitHub base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_extract_extra() -> bool {
    true
}

fn default_max_proxy_race() -> usize {
    3
}

fn default_max_concurrent() -> usize {
    3
}

fn default_proxy_timeout() -> u64 {
    3
}

fn default_direct_timeout() -> u64 {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_base_url() -> String {
    GITHUB_BASE_URL.to_string()
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            proxies: Vec::new(),
            category: SearchCategory::default(),
            extract_extra: default_extract_extra(),
            max_proxy_race: default_max_proxy_race(),
            max_concurrent: default_max_concurrent(),
            proxy_timeout_secs: default_proxy_timeout(),
            direct_timeout_secs: default_direct_timeout(),
            output_dir: default_output_dir(),
            base_url: default_base_url(),
        }
    }
}

impl CrawlerConfig {
    /// Creates a configuration searching for `keywords` with defaults.
    pub fn new<S: Into<String>>(keywords: impl IntoIterator<Item = S>) -> Self {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn with_proxies<S: Into<String>>(mut self, proxies: impl IntoIterator<Item = S>) -> Self {
        self.proxies = proxies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_category(mut self, category: SearchCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_extract_extra(mut self, extract_extra: bool) -> Self {
        self.extract_extra = extract_extra;
        self
    }

    /// Checks values that would otherwise only fail at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(CrawlError::InvalidKeywords(
                "Keywords list cannot be empty".into(),
            ));
        }
        if self.max_proxy_race == 0 {
            return Err(CrawlError::Config("max_proxy_race must be at least 1".into()));
        }
        if self.max_concurrent == 0 {
            return Err(CrawlError::Config("max_concurrent must be at least 1".into()));
        }
        if self.proxy_timeout_secs == 0 || self.direct_timeout_secs == 0 {
            return Err(CrawlError::Config("timeouts must be at least 1 second".into()));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| CrawlError::Config(format!("invalid base_url '{}': {}", self.base_url, e)))?;
        Ok(())
    }

    /// Returns the fetch timeouts and race width.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            max_proxy_race: self.max_proxy_race,
            proxy_timeout: Duration::from_secs(self.proxy_timeout_secs),
            direct_timeout: Duration::from_secs(self.direct_timeout_secs),
        }
    }

    /// Builds the proxy pool, skipping malformed specs. Returns `None` when
    /// no valid proxy remains.
    pub fn proxy_pool(&self) -> Option<Arc<ProxyPool>> {
        let pool = ProxyPool::from_specs(&self.proxies);
        (!pool.is_empty()).then(|| Arc::new(pool))
    }
}
