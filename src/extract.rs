//! Extraction of result URLs and repository metadata from GitHub pages.
//!
//! GitHub renders search results client-side from a JSON blob embedded in a
//! `<script>` tag. [`GithubExtractor`] locates that blob, walks
//! `payload.results` and turns every usable entry into a category-specific
//! URL. Entries lacking the fields a category needs are skipped.

use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{CrawlError, RepositoryInfo, Result, SearchCategory};

/// Default GitHub base URL.
pub const GITHUB_BASE_URL: &str = "https://github.com/";

/// Selectors tried in order to find the embedded search payload.
const EMBEDDED_DATA_SELECTORS: [&str; 2] = [
    r#"script[data-target="react-app.embeddedData"]"#,
    r#"script[data-target*="embeddedData"]"#,
];

const LANGUAGE_SELECTOR: &str = "span.color-fg-default.text-bold.mr-1";

/// Turns a search results page into result URLs.
pub trait ResultExtractor: Send + Sync {
    /// Returns result URLs in page order. Never fails; malformed pages yield
    /// an empty list.
    fn extract_urls(&self, html: &str, category: SearchCategory) -> Vec<String>;
}

/// Turns a single result page into enrichment metadata.
pub trait MetadataExtractor: Send + Sync {
    /// Returns `None` when the page cannot be interpreted.
    fn extract_metadata(&self, url: &str, html: &str) -> Option<RepositoryInfo>;
}

#[derive(Deserialize)]
struct EmbeddedData {
    #[serde(default)]
    payload: Option<Payload>,
}

#[derive(Deserialize)]
struct Payload {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct SearchHit {
    repo: Option<HitRepo>,
    number: Option<u64>,
    path: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize)]
struct HitRepo {
    repository: Option<HitRepository>,
}

#[derive(Deserialize)]
struct HitRepository {
    owner_login: Option<String>,
    name: Option<String>,
}

/// Extractor for github.com search and repository pages.
#[derive(Debug, Clone)]
pub struct GithubExtractor {
    base_url: String,
}

impl GithubExtractor {
    /// Creates an extractor for github.com.
    pub fn new() -> Self {
        Self::with_base_url(GITHUB_BASE_URL)
    }

    /// Creates an extractor for another GitHub host. A trailing slash is
    /// added when missing.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn parse_search_results(&self, html: &str, category: SearchCategory) -> Result<Vec<String>> {
        let document = Html::parse_document(html);

        let Some(json) = find_embedded_json(&document)? else {
            warn!("No JSON data found");
            return Ok(Vec::new());
        };

        let data: EmbeddedData = serde_json::from_str(&json)?;
        let urls = self.urls_from_payload(data, category);
        info!("Extracted {} URLs", urls.len());
        Ok(urls)
    }

    fn urls_from_payload(&self, data: EmbeddedData, category: SearchCategory) -> Vec<String> {
        let results = data.payload.map(|p| p.results).unwrap_or_default();

        results
            .into_iter()
            .filter_map(|value| serde_json::from_value::<SearchHit>(value).ok())
            .filter_map(|hit| self.url_for_hit(hit, category))
            .collect()
    }

    fn url_for_hit(&self, hit: SearchHit, category: SearchCategory) -> Option<String> {
        let repository = hit.repo?.repository?;
        let owner = repository.owner_login.filter(|s| !s.is_empty())?;
        let name = repository.name.filter(|s| !s.is_empty())?;

        match category {
            SearchCategory::Repositories => Some(format!("{}{}/{}", self.base_url, owner, name)),
            SearchCategory::Issues => {
                let number = hit.number.filter(|n| *n > 0)?;
                Some(format!("{}{}/{}/issues/{}", self.base_url, owner, name, number))
            }
            SearchCategory::Wikis => {
                let page = hit
                    .path
                    .filter(|s| !s.is_empty())
                    .or_else(|| hit.title.filter(|s| !s.is_empty()))?;
                Some(format!(
                    "{}{}/{}/wiki/{}",
                    self.base_url,
                    owner,
                    name,
                    urlencoding::encode(&page)
                ))
            }
        }
    }

    fn owner_from_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.base_url)?
            .split('/')
            .next()
            .filter(|owner| !owner.is_empty())
            .map(str::to_string)
    }
}

impl Default for GithubExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultExtractor for GithubExtractor {
    fn extract_urls(&self, html: &str, category: SearchCategory) -> Vec<String> {
        match self.parse_search_results(html, category) {
            Ok(urls) => urls,
            Err(e) => {
                warn!("Parsing error: {}", e);
                Vec::new()
            }
        }
    }
}

impl MetadataExtractor for GithubExtractor {
    fn extract_metadata(&self, url: &str, html: &str) -> Option<RepositoryInfo> {
        let owner = self.owner_from_url(url)?;

        let (languages, percents) = match language_spans(html) {
            Ok(spans) => spans,
            Err(e) => {
                debug!("Error extracting repository info for {}: {}", url, e);
                return None;
            }
        };

        let mut info = RepositoryInfo::new(owner);
        for (language, percent) in languages.into_iter().zip(percents) {
            match percent.replace('%', "").trim().parse::<f64>() {
                Ok(value) => {
                    info.language_stats.insert(language, value);
                }
                Err(_) => continue,
            }
        }

        Some(info)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| CrawlError::Parse(format!("Failed to parse selector: {:?}", e)))
}

fn find_embedded_json(document: &Html) -> Result<Option<String>> {
    for css in EMBEDDED_DATA_SELECTORS {
        if let Some(script) = document.select(&selector(css)?).next() {
            return Ok(Some(script.text().collect()));
        }
    }

    let script = selector("script")?;
    Ok(document
        .select(&script)
        .map(|s| s.text().collect::<String>())
        .find(|text| text.contains("payload")))
}

/// Language labels and the percentage strings, both in document order.
fn language_spans(html: &str) -> Result<(Vec<String>, Vec<String>)> {
    let document = Html::parse_document(html);

    let languages = document
        .select(&selector(LANGUAGE_SELECTOR)?)
        .map(|span| own_text(span).trim().to_string())
        .filter(|language| !language.is_empty())
        .collect();

    let percents = document
        .select(&selector("span")?)
        .map(own_text)
        .filter(|text| text.contains('%'))
        .collect();

    Ok((languages, percents))
}

/// Text of the element's direct text children only.
fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|child| child.value().as_text().map(|t| t.to_string()))
        .collect()
}
