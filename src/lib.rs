//! # gitcrawler
//!
//! A GitHub search crawler built for unreliable egress.
//!
//! This library fetches GitHub search result pages, extracts result URLs
//! from the JSON embedded in the page, and enriches repository results with
//! owner and language statistics. It provides:
//!
//! - A proxy pool with round-robin rotation and per-session failure memory
//! - Concurrent proxy racing with first-success-wins and direct fallback
//! - Bounded-concurrency enrichment that keeps result order
//! - CSV export of results
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use gitcrawler::{Fetcher, HttpTransport, ProxyPool, SearchPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = Arc::new(ProxyPool::from_specs(&["10.0.0.1:3128", "user:pass@10.0.0.2:8080"]));
//!     let fetcher = Fetcher::new(HttpTransport::new()?).with_pool(pool);
//!     let pipeline = SearchPipeline::new(Arc::new(fetcher));
//!
//!     let items = pipeline.search(&["python", "jwt"], "repositories", true).await?;
//!     for item in &items {
//!         println!("{} {:?}", item.url, item.extra);
//!     }
//!     Ok(())
//! }
//! ```

mod category;
mod config;
mod crawler;
mod error;
mod item;
mod search;
mod sink;

pub mod extract;
pub mod fetcher;
pub mod fetcher_http;
pub mod proxy;

pub use category::SearchCategory;
pub use config::CrawlerConfig;
pub use crawler::{CrawlReport, Crawler};
pub use error::{CrawlError, Result};
pub use extract::{GithubExtractor, MetadataExtractor, ResultExtractor};
pub use fetcher::{FetchConfig, FetchOutcome, Fetcher, Transport};
pub use fetcher_http::HttpTransport;
pub use item::{DiscoveredItem, RepositoryInfo};
pub use proxy::{ProxyEndpoint, ProxyPool, ProxyProtocol};
pub use search::SearchPipeline;
pub use sink::{CsvSink, ResultSink};
