//! Search orchestration.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::extract::{GithubExtractor, MetadataExtractor, ResultExtractor, GITHUB_BASE_URL};
use crate::{CrawlError, DiscoveredItem, Fetcher, RepositoryInfo, Result, SearchCategory};

/// Default ceiling on concurrent enrichment fetches.
pub const DEFAULT_MAX_CONCURRENT: usize = 3;

/// Runs one GitHub search: fetch the results page, extract URLs, and
/// optionally enrich each URL from its own page.
pub struct SearchPipeline {
    fetcher: Arc<Fetcher>,
    extractor: Arc<dyn ResultExtractor>,
    metadata: Arc<dyn MetadataExtractor>,
    custom_extractor: bool,
    custom_metadata: bool,
    max_concurrent: usize,
    base_url: String,
}

impl SearchPipeline {
    /// Creates a pipeline for github.com using [`GithubExtractor`].
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        let extractor = Arc::new(GithubExtractor::new());
        Self {
            fetcher,
            extractor: extractor.clone(),
            metadata: extractor,
            custom_extractor: false,
            custom_metadata: false,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            base_url: GITHUB_BASE_URL.to_string(),
        }
    }

    /// Replaces the search results extractor.
    pub fn with_extractor<E: ResultExtractor + 'static>(mut self, extractor: E) -> Self {
        self.extractor = Arc::new(extractor);
        self.custom_extractor = true;
        self
    }

    /// Replaces the per-item metadata extractor.
    pub fn with_metadata_extractor<M: MetadataExtractor + 'static>(mut self, metadata: M) -> Self {
        self.metadata = Arc::new(metadata);
        self.custom_metadata = true;
        self
    }

    /// Sets the enrichment concurrency ceiling. Values below one are raised
    /// to one.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Sets the GitHub host. Search URLs are built against it and the
    /// built-in extractors resolve result URLs against it; extractors set
    /// through [`with_extractor`](Self::with_extractor) or
    /// [`with_metadata_extractor`](Self::with_metadata_extractor) are kept.
    /// A trailing slash is added when missing.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let github = Arc::new(GithubExtractor::with_base_url(base_url));
        if !self.custom_extractor {
            self.extractor = github.clone();
        }
        if !self.custom_metadata {
            self.metadata = github.clone();
        }
        self.base_url = github.base_url().to_string();
        self
    }

    /// Returns the underlying fetcher.
    pub fn fetcher(&self) -> &Arc<Fetcher> {
        &self.fetcher
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Builds the search URL for the given keywords and category.
    pub fn build_search_url<S: AsRef<str>>(&self, keywords: &[S], category: SearchCategory) -> String {
        let query = keywords
            .iter()
            .map(|k| urlencoding::encode(k.as_ref()).into_owned())
            .collect::<Vec<_>>()
            .join("+");
        format!("{}search?q={}&type={}", self.base_url, query, category)
    }

    /// Performs a search.
    ///
    /// Fails only on an unsupported category or an empty keyword list, both
    /// checked before any request is made. A page that cannot be fetched
    /// yields an empty result; items whose enrichment fails are returned
    /// without a payload. Output order follows the results page.
    pub async fn search<S: AsRef<str>>(
        &self,
        keywords: &[S],
        category: &str,
        extract_extra: bool,
    ) -> Result<Vec<DiscoveredItem>> {
        let category: SearchCategory = category.parse()?;

        let keywords: Vec<&str> = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Err(CrawlError::InvalidKeywords(
                "Keywords list cannot be empty".into(),
            ));
        }

        let start = Instant::now();
        let search_url = self.build_search_url(&keywords, category);
        info!("Searching: {}", search_url);

        let Some(html) = self.fetcher.fetch_page(&search_url).await else {
            warn!("Could not fetch {}", search_url);
            return Ok(Vec::new());
        };

        let urls = self.extractor.extract_urls(&html, category);

        let items = if category.supports_enrichment() && extract_extra && !urls.is_empty() {
            info!("Extracting repository info for {} repositories...", urls.len());
            self.enrich(urls).await
        } else {
            urls.into_iter().map(DiscoveredItem::new).collect()
        };

        debug!(
            "Search returned {} items in {}ms",
            items.len(),
            start.elapsed().as_millis()
        );
        Ok(items)
    }

    /// Enriches every URL concurrently, at most `max_concurrent` at a time.
    /// Dropping the returned future aborts all outstanding fetches.
    async fn enrich(&self, urls: Vec<String>) -> Vec<DiscoveredItem> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        for (index, url) in urls.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let fetcher = Arc::clone(&self.fetcher);
            let metadata = Arc::clone(&self.metadata);
            let url = url.clone();

            tasks.spawn(async move {
                let extra = match semaphore.acquire_owned().await {
                    Ok(_permit) => repository_info(&fetcher, metadata.as_ref(), &url).await,
                    Err(_) => None,
                };
                (index, extra)
            });
        }

        let mut extras: Vec<Option<RepositoryInfo>> = vec![None; urls.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, extra)) => extras[index] = extra,
                Err(e) => warn!("Enrichment task failed: {}", e),
            }
        }

        urls.into_iter()
            .zip(extras)
            .map(|(url, extra)| DiscoveredItem { url, extra })
            .collect()
    }
}

async fn repository_info(
    fetcher: &Fetcher,
    metadata: &dyn MetadataExtractor,
    url: &str,
) -> Option<RepositoryInfo> {
    let Some(html) = fetcher.fetch_page(url).await else {
        debug!("No page for {}", url);
        return None;
    };
    metadata.extract_metadata(url, &html)
}
