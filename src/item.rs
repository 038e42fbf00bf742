//! Search result types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Owner and language breakdown scraped from a repository page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    /// Repository owner login.
    pub owner: String,
    /// Language name mapped to its share of the code base, in percent.
    pub language_stats: BTreeMap<String, f64>,
}

impl RepositoryInfo {
    /// Creates info with no language statistics.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            language_stats: BTreeMap::new(),
        }
    }

    /// Adds a language percentage.
    pub fn with_language(mut self, language: impl Into<String>, percent: f64) -> Self {
        self.language_stats.insert(language.into(), percent);
        self
    }
}

/// A single URL found by a search, optionally enriched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredItem {
    /// Canonical result URL.
    pub url: String,
    /// Enrichment payload; `None` when enrichment was not attempted or failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<RepositoryInfo>,
}

impl DiscoveredItem {
    /// Creates an item without enrichment.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extra: None,
        }
    }

    /// Attaches an enrichment payload.
    pub fn with_extra(mut self, extra: RepositoryInfo) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Returns whether the item carries enrichment.
    pub fn is_enriched(&self) -> bool {
        self.extra.is_some()
    }
}
