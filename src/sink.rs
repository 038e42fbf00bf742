//! Persistence of search results.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::{DiscoveredItem, Result, SearchCategory};

/// Receives the final results of a search.
pub trait ResultSink: Send + Sync {
    /// Persists `items` and returns where they were written.
    fn save(
        &self,
        items: &[DiscoveredItem],
        category: SearchCategory,
        keywords: &[String],
    ) -> Result<PathBuf>;
}

/// Writes one CSV file per search into an output directory.
///
/// Enriched repository searches get `url,owner,language_stats` columns with
/// the language statistics serialized as a JSON object; everything else gets
/// a single `url` column.
#[derive(Debug, Clone)]
pub struct CsvSink {
    output_dir: PathBuf,
}

impl CsvSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn file_name(category: SearchCategory, keywords: &[String]) -> String {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let keywords = keywords
            .iter()
            .take(3)
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join("_");
        format!("{}_{}_{}.csv", category, sanitize(&keywords), timestamp)
    }

    fn render(items: &[DiscoveredItem], category: SearchCategory) -> Result<String> {
        let detailed = category == SearchCategory::Repositories
            && items.first().is_some_and(DiscoveredItem::is_enriched);

        let mut out = String::new();
        if detailed {
            out.push_str("url,owner,language_stats\r\n");
            for item in items {
                let (owner, stats) = match &item.extra {
                    Some(extra) => (extra.owner.clone(), serde_json::to_string(&extra.language_stats)?),
                    None => (String::new(), String::new()),
                };
                push_row(&mut out, &[item.url.as_str(), owner.as_str(), stats.as_str()]);
            }
        } else {
            out.push_str("url\r\n");
            for item in items {
                push_row(&mut out, &[item.url.as_str()]);
            }
        }
        Ok(out)
    }
}

impl ResultSink for CsvSink {
    fn save(
        &self,
        items: &[DiscoveredItem],
        category: SearchCategory,
        keywords: &[String],
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(Self::file_name(category, keywords));
        fs::write(&path, Self::render(items, category)?)?;
        info!("Saved {} results to {}", items.len(), path.display());
        Ok(path)
    }
}

fn push_row(out: &mut String, fields: &[&str]) {
    let row = fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(",");
    out.push_str(&row);
    out.push_str("\r\n");
}

/// Quotes a CSV field when it contains a delimiter, quote or line break.
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Keeps file names portable.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RepositoryInfo;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn csv_files(dir: &Path, prefix: &str) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                let name = p.file_name().unwrap().to_string_lossy();
                name.starts_with(prefix) && name.ends_with(".csv")
            })
            .collect()
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a,b"), "\"a,b\"");
        assert_eq!(quote(r#"{"Python":80.0}"#), r#""{""Python"":80.0}""#);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("python_jwt"), "python_jwt");
        assert_eq!(sanitize("c++_a/b"), "c--_a-b");
    }

    #[test]
    fn test_save_repositories_with_extra() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path());
        let items = vec![
            DiscoveredItem::new("https://github.com/user1/repo1")
                .with_extra(RepositoryInfo::new("user1").with_language("Python", 80.0)),
            DiscoveredItem::new("https://github.com/user2/repo2"),
        ];

        let path = sink
            .save(&items, SearchCategory::Repositories, &keywords(&["python"]))
            .unwrap();

        assert_eq!(csv_files(dir.path(), "repositories_python_").len(), 1);
        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "url,owner,language_stats");
        assert_eq!(
            lines[1],
            r#"https://github.com/user1/repo1,user1,"{""Python"":80.0}""#
        );
        assert_eq!(lines[2], "https://github.com/user2/repo2,,");
    }

    #[test]
    fn test_save_simple_results() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path());
        let items = vec![DiscoveredItem::new("https://github.com/user/repo")];

        let path = sink
            .save(&items, SearchCategory::Issues, &keywords(&["bug"]))
            .unwrap();

        assert_eq!(csv_files(dir.path(), "issues_bug_").len(), 1);
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, "url\r\nhttps://github.com/user/repo\r\n");
    }

    #[test]
    fn test_save_repositories_without_extra_uses_url_column() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path());
        let items = vec![DiscoveredItem::new("https://github.com/user/repo")];

        let path = sink
            .save(&items, SearchCategory::Repositories, &keywords(&["a"]))
            .unwrap();

        assert!(fs::read_to_string(path).unwrap().starts_with("url\r\n"));
    }

    #[test]
    fn test_save_uses_first_three_keywords() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path().join("nested"));

        let path = sink
            .save(&[], SearchCategory::Wikis, &keywords(&["a", "b", "c", "d"]))
            .unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("wikis_a_b_c_"));
        assert!(!name.contains("_d_"));
    }
}
