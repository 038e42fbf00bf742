//! GitHub search categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CrawlError;

/// Categories supported by GitHub search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SearchCategory {
    #[default]
    Repositories,
    Issues,
    Wikis,
}

impl SearchCategory {
    /// All supported categories.
    pub const ALL: [SearchCategory; 3] = [Self::Repositories, Self::Issues, Self::Wikis];

    /// Returns the value used for the `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repositories => "repositories",
            Self::Issues => "issues",
            Self::Wikis => "wikis",
        }
    }

    /// Returns whether results of this category can be enriched from their
    /// own page.
    pub fn supports_enrichment(&self) -> bool {
        matches!(self, Self::Repositories)
    }
}

impl fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchCategory {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "repositories" => Ok(Self::Repositories),
            "issues" => Ok(Self::Issues),
            "wikis" => Ok(Self::Wikis),
            _ => Err(CrawlError::InvalidCategory(s.to_string())),
        }
    }
}

impl TryFrom<String> for SearchCategory {
    type Error = CrawlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_default() {
        assert_eq!(SearchCategory::default(), SearchCategory::Repositories);
    }

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!("Repositories".parse::<SearchCategory>().unwrap(), SearchCategory::Repositories);
        assert_eq!("ISSUES".parse::<SearchCategory>().unwrap(), SearchCategory::Issues);
        assert_eq!(" wikis ".parse::<SearchCategory>().unwrap(), SearchCategory::Wikis);
    }

    #[test]
    fn test_category_parse_unknown() {
        let err = "users".parse::<SearchCategory>().unwrap_err();
        assert!(matches!(err, CrawlError::InvalidCategory(ref c) if c == "users"));
    }

    #[test]
    fn test_category_display_round_trips() {
        for category in SearchCategory::ALL {
            assert_eq!(category.to_string().parse::<SearchCategory>().unwrap(), category);
        }
    }

    #[test]
    fn test_category_enrichment_support() {
        assert!(SearchCategory::Repositories.supports_enrichment());
        assert!(!SearchCategory::Issues.supports_enrichment());
        assert!(!SearchCategory::Wikis.supports_enrichment());
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&SearchCategory::Issues).unwrap();
        assert_eq!(json, "\"issues\"");
        let category: SearchCategory = serde_json::from_str("\"wikis\"").unwrap();
        assert_eq!(category, SearchCategory::Wikis);
    }

    #[test]
    fn test_category_deserialization_matches_parse() {
        let category: SearchCategory = serde_json::from_str("\"Repositories\"").unwrap();
        assert_eq!(category, SearchCategory::Repositories);
        let category: SearchCategory = serde_json::from_str("\" ISSUES \"").unwrap();
        assert_eq!(category, SearchCategory::Issues);

        let err = serde_json::from_str::<SearchCategory>("\"users\"").unwrap_err();
        assert!(err.to_string().contains("users"));
    }
}
