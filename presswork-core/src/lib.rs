//! # presswork-core
//!
//! Core library for the presswork newspaper page generator.
//!
//! Markdown articles with YAML front-matter are rendered into copies of a
//! shared HTML template, and each processed article is appended to a JSON
//! index.

pub mod builder;
pub mod config;
pub mod frontmatter;
pub mod heading;
pub mod index;
pub mod markdown;
mod markup;
pub mod models;
pub mod render;
pub mod slug;
pub mod template;

pub use builder::{BuildError, Discovery, SiteBuilder};
pub use config::{CollisionPolicy, Config};
pub use index::{IndexState, IndexStore};
pub use markdown::MarkdownProcessor;
pub use models::{ArticleFailure, ArticleMetadata, BatchReport, IndexRecord, RenderedArticle};
pub use render::ArticleRenderer;
pub use slug::slugify;
pub use template::TemplateSource;
