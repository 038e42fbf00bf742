//! Proxy-racing page fetcher.
//!
//! [`Fetcher::fetch_page`] races up to `max_proxy_race` proxied attempts and
//! keeps the first body that comes back; the losers are aborted. When no proxy
//! is configured, or every raced proxy fails, a single direct attempt is made.
//! Transport problems never surface as errors here: they mark proxies as
//! failed and turn into `None`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::proxy::{ProxyEndpoint, ProxyPool};
use crate::Result;

/// Default number of proxies raced per request.
pub const DEFAULT_MAX_PROXY_RACE: usize = 3;

/// Default timeout for a proxied attempt.
pub const DEFAULT_PROXY_TIMEOUT: Duration = Duration::from_secs(3);

/// Default timeout for a direct attempt.
pub const DEFAULT_DIRECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait for issuing a single GET request, optionally through a proxy.
///
/// Any transport error, timeout or non-success status is reported as `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches the body of `url`.
    async fn get(&self, url: &str, proxy: Option<&ProxyEndpoint>, timeout: Duration)
        -> Result<String>;
}

/// Outcome of a single proxied attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The attempt returned a body.
    Success(String),
    /// The attempt failed; there is no body.
    Failed,
}

impl FetchOutcome {
    /// Returns whether the attempt succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the body, if any.
    pub fn into_content(self) -> Option<String> {
        match self {
            Self::Success(content) => Some(content),
            Self::Failed => None,
        }
    }
}

/// Timeouts and race width for a [`Fetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConfig {
    /// Maximum number of proxies raced per request.
    pub max_proxy_race: usize,
    /// Timeout for each proxied attempt.
    pub proxy_timeout: Duration,
    /// Timeout for a direct attempt.
    pub direct_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_proxy_race: DEFAULT_MAX_PROXY_RACE,
            proxy_timeout: DEFAULT_PROXY_TIMEOUT,
            direct_timeout: DEFAULT_DIRECT_TIMEOUT,
        }
    }
}

/// Fetches pages through a [`ProxyPool`], falling back to direct connections.
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    pool: Option<Arc<ProxyPool>>,
    config: FetchConfig,
}

impl Fetcher {
    /// Creates a fetcher that always connects directly.
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self::with_transport(Arc::new(transport))
    }

    /// Creates a fetcher from a shared transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            pool: None,
            config: FetchConfig::default(),
        }
    }

    /// Sets the proxy pool. An empty pool behaves like no pool.
    pub fn with_pool(mut self, pool: Arc<ProxyPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Sets timeouts and race width.
    pub fn with_config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the proxy pool if configured.
    pub fn pool(&self) -> Option<&Arc<ProxyPool>> {
        self.pool.as_ref()
    }

    /// Returns the fetch configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Single attempt without a proxy.
    pub async fn fetch_direct(&self, url: &str, timeout: Duration) -> Option<String> {
        match self.transport.get(url, None, timeout).await {
            Ok(content) => Some(content),
            Err(e) => {
                debug!("Direct fetch of {} failed: {}", url, e);
                None
            }
        }
    }

    /// Single attempt through `proxy`.
    pub async fn fetch_with_proxy(
        &self,
        url: &str,
        proxy: &ProxyEndpoint,
        timeout: Duration,
    ) -> FetchOutcome {
        attempt(self.transport.as_ref(), url, proxy, timeout).await
    }

    /// Fetches `url`, racing proxies first and falling back to a direct
    /// connection.
    pub async fn fetch_page(&self, url: &str) -> Option<String> {
        let pool = match &self.pool {
            Some(pool) if !pool.is_empty() => Arc::clone(pool),
            _ => return self.fetch_direct(url, self.config.direct_timeout).await,
        };

        let candidates = self.draw_candidates(&pool).await;
        if candidates.is_empty() {
            debug!("No proxy candidates available for {}", url);
        } else if let Some(content) = self.race(url, &pool, candidates).await {
            return Some(content);
        }

        debug!("Falling back to direct fetch for {}", url);
        self.fetch_direct(url, self.config.direct_timeout).await
    }

    async fn draw_candidates(&self, pool: &ProxyPool) -> Vec<ProxyEndpoint> {
        let wanted = self.config.max_proxy_race.min(pool.len());
        let mut candidates: Vec<ProxyEndpoint> = Vec::with_capacity(wanted);

        for _ in 0..wanted {
            if let Some(proxy) = pool.next_candidate().await {
                if !candidates.contains(&proxy) {
                    candidates.push(proxy);
                }
            }
        }

        candidates
    }

    async fn race(
        &self,
        url: &str,
        pool: &Arc<ProxyPool>,
        candidates: Vec<ProxyEndpoint>,
    ) -> Option<String> {
        let mut attempts = JoinSet::new();

        for proxy in candidates {
            let transport = Arc::clone(&self.transport);
            let pool = Arc::clone(pool);
            let url = url.to_string();
            let timeout = self.config.proxy_timeout;

            // Failures are recorded in the task itself; aborted attempts
            // never reach mark_failed.
            attempts.spawn(async move {
                let outcome = attempt(transport.as_ref(), &url, &proxy, timeout).await;
                if !outcome.is_success() {
                    pool.mark_failed(&proxy).await;
                }
                outcome
            });
        }

        while let Some(joined) = attempts.join_next().await {
            match joined {
                Ok(FetchOutcome::Success(content)) => {
                    attempts.abort_all();
                    return Some(content);
                }
                Ok(FetchOutcome::Failed) => {}
                Err(e) => warn!("Proxy attempt for {} did not complete: {}", url, e),
            }
        }

        None
    }
}

async fn attempt(
    transport: &dyn Transport,
    url: &str,
    proxy: &ProxyEndpoint,
    timeout: Duration,
) -> FetchOutcome {
    match transport.get(url, Some(proxy), timeout).await {
        Ok(content) => FetchOutcome::Success(content),
        Err(e) => {
            debug!("Fetch of {} via {} failed: {}", url, proxy, e);
            FetchOutcome::Failed
        }
    }
}
