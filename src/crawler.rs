//! One configured crawl session: search, then persist.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::{
    CrawlerConfig, CsvSink, DiscoveredItem, Fetcher, HttpTransport, Result, ResultSink,
    SearchPipeline, Transport,
};

/// Results of a finished crawl.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub items: Vec<DiscoveredItem>,
    /// Where the sink wrote the items, if a sink was configured.
    pub saved_to: Option<PathBuf>,
}

/// Wires a [`CrawlerConfig`] into a [`SearchPipeline`] and a [`ResultSink`].
pub struct Crawler {
    config: CrawlerConfig,
    pipeline: SearchPipeline,
    sink: Option<Box<dyn ResultSink>>,
}

impl Crawler {
    /// Builds a crawler using HTTP transport and a CSV sink in
    /// `config.output_dir`.
    pub fn from_config(config: CrawlerConfig) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);
        let sink = CsvSink::new(config.output_dir.clone());
        Self::with_transport(config, transport).map(|c| c.with_sink(sink))
    }

    /// Builds a crawler over any transport, without a sink.
    pub fn with_transport(config: CrawlerConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;

        let mut fetcher = Fetcher::with_transport(transport).with_config(config.fetch_config());
        match config.proxy_pool() {
            Some(pool) => {
                info!("Using {} proxies", pool.len());
                fetcher = fetcher.with_pool(pool);
            }
            None => info!("No proxies configured, connecting directly"),
        }

        let pipeline = SearchPipeline::new(Arc::new(fetcher))
            .with_max_concurrent(config.max_concurrent)
            .with_base_url(config.base_url.clone());

        Ok(Self {
            config,
            pipeline,
            sink: None,
        })
    }

    /// Sets the sink receiving results.
    pub fn with_sink<S: ResultSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Removes the sink; results are only returned.
    pub fn without_sink(mut self) -> Self {
        self.sink = None;
        self
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &SearchPipeline {
        &self.pipeline
    }

    /// Runs the search and hands the results to the sink.
    pub async fn crawl(&self) -> Result<CrawlReport> {
        let items = self
            .pipeline
            .search(
                &self.config.keywords,
                self.config.category.as_str(),
                self.config.extract_extra,
            )
            .await?;

        let saved_to = match &self.sink {
            Some(sink) => Some(sink.save(&items, self.config.category, &self.config.keywords)?),
            None => None,
        };

        Ok(CrawlReport { items, saved_to })
    }
}
