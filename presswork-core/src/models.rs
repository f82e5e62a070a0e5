//! Content model structs for articles, index records, and batch results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Date format shown on rendered pages
pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";

/// Date format stored in the index
pub const INDEX_DATE_FORMAT: &str = "%Y-%m-%d";

/// Validated front-matter of a single article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub title: String,
    pub date: NaiveDate,
    pub author: String,
    pub tags: Vec<String>,
}

impl ArticleMetadata {
    /// Byline text shown under the headline
    pub fn byline(&self) -> String {
        format!("By {}", self.author)
    }

    /// Date as shown on the page (e.g. `01/05/2024`)
    pub fn display_date(&self) -> String {
        self.date.format(DISPLAY_DATE_FORMAT).to_string()
    }

    /// Date as stored in the index (e.g. `2024-01-05`)
    pub fn index_date(&self) -> String {
        self.date.format(INDEX_DATE_FORMAT).to_string()
    }

    /// Tags joined for the `data-tags` attribute
    pub fn joined_tags(&self) -> String {
        self.tags.join(",")
    }
}

/// One entry of the persisted article index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub title: String,
    pub author: String,
    pub date: String,
    pub tags: Vec<String>,
    pub filename: String,
}

impl IndexRecord {
    pub fn new(meta: &ArticleMetadata, filename: impl Into<String>) -> Self {
        Self {
            title: meta.title.clone(),
            author: meta.author.clone(),
            date: meta.index_date(),
            tags: meta.tags.clone(),
            filename: filename.into(),
        }
    }
}

/// A page that was written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArticle {
    /// Source markdown file, when rendered from the batch driver
    pub source: Option<PathBuf>,
    /// Output HTML path
    pub output: PathBuf,
    /// Record appended to the index
    pub record: IndexRecord,
}

/// An article whose pipeline failed; the batch continued without it
#[derive(Debug)]
pub struct ArticleFailure {
    pub source: PathBuf,
    pub error: crate::builder::BuildError,
}

/// Outcome of one batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub rendered: Vec<RenderedArticle>,
    pub failures: Vec<ArticleFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn processed(&self) -> usize {
        self.rendered.len() + self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ArticleMetadata {
        ArticleMetadata {
            title: "My Post".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            author: "Jo".into(),
            tags: vec!["a".into(), "b".into()],
        }
    }

    #[test]
    fn test_formatting_helpers() {
        let meta = sample();
        assert_eq!(meta.byline(), "By Jo");
        assert_eq!(meta.display_date(), "01/05/2024");
        assert_eq!(meta.index_date(), "2024-01-05");
        assert_eq!(meta.joined_tags(), "a,b");
    }

    #[test]
    fn test_index_record_from_metadata() {
        let record = IndexRecord::new(&sample(), "my-post.html");
        assert_eq!(
            record,
            IndexRecord {
                title: "My Post".into(),
                author: "Jo".into(),
                date: "2024-01-05".into(),
                tags: vec!["a".into(), "b".into()],
                filename: "my-post.html".into(),
            }
        );
    }

    #[test]
    fn test_index_record_field_order() {
        let json = serde_json::to_string(&IndexRecord::new(&sample(), "my-post.html")).unwrap();
        assert_eq!(
            json,
            r#"{"title":"My Post","author":"Jo","date":"2024-01-05","tags":["a","b"],"filename":"my-post.html"}"#
        );
    }

    #[test]
    fn test_empty_tags_join() {
        let mut meta = sample();
        meta.tags.clear();
        assert_eq!(meta.joined_tags(), "");
    }
}
