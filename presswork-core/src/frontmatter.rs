//! Front-matter parsing from markdown articles.

use crate::models::ArticleMetadata;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("No front-matter block found")]
    MissingFrontmatter,

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?s)\A\x{feff}?---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n(.*))?\z")
            .expect("front-matter regex is valid")
    })
}

/// Front-matter as written; every key is optional until validated.
#[derive(Debug, Default, Deserialize)]
struct RawFrontmatter {
    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    date: Option<String>,

    #[serde(default)]
    author: Option<String>,

    #[serde(default)]
    tags: Option<Tags>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Tags {
    Many(Vec<String>),
    One(String),
}

impl From<Tags> for Vec<String> {
    fn from(tags: Tags) -> Self {
        match tags {
            Tags::Many(tags) => tags,
            Tags::One(tag) => vec![tag],
        }
    }
}

/// Split an article into validated metadata and its markdown body.
///
/// All of `title`, `date`, `author` and `tags` must be present.
///
/// # Example
///
/// ```
/// use presswork_core::frontmatter::parse_article;
///
/// let content = "---\ntitle: My Post\ndate: 2024-01-05\nauthor: Jo\ntags: [a, b]\n---\n# Hi\n";
///
/// let (meta, body) = parse_article(content).unwrap();
/// assert_eq!(meta.title, "My Post");
/// assert_eq!(meta.tags, vec!["a", "b"]);
/// assert_eq!(body, "# Hi\n");
/// ```
pub fn parse_article(content: &str) -> Result<(ArticleMetadata, String), FrontmatterError> {
    let captures = frontmatter_regex()
        .captures(content)
        .ok_or(FrontmatterError::MissingFrontmatter)?;

    let yaml = captures.get(1).map_or("", |m| m.as_str());
    let body = captures.get(2).map_or("", |m| m.as_str());

    let raw: RawFrontmatter = if yaml.trim().is_empty() {
        RawFrontmatter::default()
    } else {
        serde_yaml::from_str(yaml)?
    };

    Ok((validate(raw)?, body.to_string()))
}

fn validate(raw: RawFrontmatter) -> Result<ArticleMetadata, FrontmatterError> {
    let title = raw.title.ok_or(FrontmatterError::MissingField("title"))?;
    let date = raw.date.ok_or(FrontmatterError::MissingField("date"))?;
    let author = raw.author.ok_or(FrontmatterError::MissingField("author"))?;
    let tags = raw.tags.ok_or(FrontmatterError::MissingField("tags"))?;

    Ok(ArticleMetadata {
        title,
        date: parse_date(&date)?,
        author,
        tags: tags.into(),
    })
}

/// Parse a calendar date, accepting a plain date or a timestamp.
pub fn parse_date(value: &str) -> Result<NaiveDate, FrontmatterError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(datetime.date());
    }
    Err(FrontmatterError::InvalidDate(value.to_string()))
}
