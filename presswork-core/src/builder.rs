//! Batch building - discovers articles and drives the per-article pipeline.

use crate::{
    config::Config,
    frontmatter::{parse_article, FrontmatterError},
    index::IndexStore,
    markdown::MarkdownProcessor,
    models::{ArticleFailure, BatchReport, RenderedArticle},
    render::{ArticleRenderer, RenderError},
    template::{TemplateError, TemplateSource},
};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Failed to list {path:?}: {source}")]
    Discover {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Front-matter error: {0}")]
    Frontmatter(#[from] FrontmatterError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Main batch builder
pub struct SiteBuilder {
    config: Config,
    processor: MarkdownProcessor,
}

impl SiteBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            processor: MarkdownProcessor::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build every article in the configured articles directory
    pub fn build(&self) -> Result<BatchReport, BuildError> {
        self.run(&self.config.articles_dir())
    }

    /// Build every article in `input_dir`
    ///
    /// Failing articles are collected in the report and the batch carries on.
    /// Only an unreadable input directory or template aborts the run.
    pub fn run(&self, input_dir: &Path) -> Result<BatchReport, BuildError> {
        let Discovery { articles, failures } =
            discover_articles(input_dir, &self.config.extension)?;
        tracing::info!("Found {} articles in {:?}", articles.len(), input_dir);

        let template = TemplateSource::load(self.config.template_path())?;
        let mut renderer = ArticleRenderer::new(
            template,
            self.config.output_dir(),
            IndexStore::new(self.config.index_path()),
        )
        .with_collision_policy(self.config.on_collision);

        let mut report = BatchReport {
            failures,
            ..BatchReport::default()
        };
        for path in articles {
            match self.process_article(&mut renderer, &path) {
                Ok(mut rendered) => {
                    rendered.source = Some(path);
                    report.rendered.push(rendered);
                }
                Err(error) => {
                    tracing::error!("Failed to process {:?}: {}", path, error);
                    report.failures.push(ArticleFailure {
                        source: path,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            "Rendered {} of {} articles",
            report.rendered.len(),
            report.processed()
        );

        Ok(report)
    }

    /// Parse, transform, render and index a single article
    fn process_article(
        &self,
        renderer: &mut ArticleRenderer,
        path: &Path,
    ) -> Result<RenderedArticle, BuildError> {
        let content = fs::read_to_string(path).map_err(|source| BuildError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let (meta, body) = parse_article(&content)?;
        let fragment = self.processor.convert(&body);
        Ok(renderer.render(&meta, &fragment)?)
    }
}

/// Result of listing the articles directory
#[derive(Debug, Default)]
pub struct Discovery {
    /// Article files, sorted by name
    pub articles: Vec<PathBuf>,
    /// Article entries that could not be inspected
    pub failures: Vec<ArticleFailure>,
}

/// Regular files directly inside `dir` with the given extension, sorted by name
///
/// Only failing to read `dir` itself is an error. An entry that cannot be
/// inspected (a dangling symlink, say) is recorded as a failure when its
/// name carries the article extension and skipped with a warning otherwise.
pub fn discover_articles(dir: &Path, extension: &str) -> Result<Discovery, BuildError> {
    let mut discovery = Discovery::default();
    let has_extension = |path: &Path| path.extension().is_some_and(|ext| ext == extension);

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(BuildError::Discover {
                    path: dir.to_path_buf(),
                    source,
                });
            }
            Err(source) => {
                let path = source.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf);
                tracing::warn!("Cannot inspect {:?}: {}", path, source);
                if has_extension(&path) {
                    discovery.failures.push(ArticleFailure {
                        source: path.clone(),
                        error: BuildError::Discover { path, source },
                    });
                }
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if has_extension(entry.path()) {
            discovery.articles.push(entry.into_path());
        } else {
            tracing::debug!("Skipping {:?}", entry.path());
        }
    }

    Ok(discovery)
}
