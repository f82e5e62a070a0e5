//! Page rendering: metadata and content injected into the newspaper template.

use crate::{
    config::CollisionPolicy,
    index::{IndexError, IndexStore},
    models::{ArticleMetadata, IndexRecord, RenderedArticle},
    slug::output_filename,
    template::{parse_fragment, Document, Element, TemplateError, TemplateSource},
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Template has no element matching `{0}`")]
    MissingSlot(&'static str),

    #[error("{0:?} was already written by an earlier article in this run")]
    SlugCollision(PathBuf),

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The page is on disk but has no index record
    #[error("Wrote {page:?} but failed to update the index: {source}")]
    Index {
        page: PathBuf,
        #[source]
        source: IndexError,
    },
}

/// Template elements that receive article data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    DocumentTitle,
    Headline,
    Author,
    Date,
    Tags,
    Container,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::DocumentTitle,
        Slot::Headline,
        Slot::Author,
        Slot::Date,
        Slot::Tags,
        Slot::Container,
    ];

    pub fn selector(&self) -> &'static str {
        match self {
            Slot::DocumentTitle => "title",
            Slot::Headline => ".newspaper-title",
            Slot::Author => ".newspaper-info-author",
            Slot::Date => ".newspaper-info-date",
            Slot::Tags => ".newspaper-info-tags",
            Slot::Container => ".newspaper-container",
        }
    }

    fn locate<'a>(&self, doc: &'a mut Document) -> Result<&'a mut Element, RenderError> {
        let selector = self.selector();
        let found = match selector.strip_prefix('.') {
            Some(class) => doc.find_class_mut(class),
            None => doc.find_tag_mut(selector),
        };
        found.ok_or(RenderError::MissingSlot(selector))
    }
}

/// Attribute on the tag list element holding the joined tags
pub const TAGS_ATTRIBUTE: &str = "data-tags";

/// Fill a template document with one article
pub fn fill_document(
    doc: &mut Document,
    meta: &ArticleMetadata,
    fragment: &str,
) -> Result<(), RenderError> {
    // Fail before touching the tree if any slot is absent
    for slot in Slot::ALL {
        slot.locate(doc)?;
    }
    let content = parse_fragment(fragment)?;

    Slot::DocumentTitle.locate(doc)?.set_text(&meta.title);
    Slot::Headline.locate(doc)?.set_text(&meta.title);
    Slot::Author.locate(doc)?.set_text(&meta.byline());
    Slot::Date.locate(doc)?.set_text(&meta.display_date());

    let tags = Slot::Tags.locate(doc)?;
    tags.clear_children();
    tags.set_attr(TAGS_ATTRIBUTE, &meta.joined_tags());

    let container = Slot::Container.locate(doc)?;
    container.clear_children();
    container.append_children(content);

    Ok(())
}

/// Writes article pages and records them in the index
pub struct ArticleRenderer {
    template: TemplateSource,
    output_dir: PathBuf,
    index: IndexStore,
    on_collision: CollisionPolicy,
    written: HashSet<PathBuf>,
}

impl ArticleRenderer {
    pub fn new(template: TemplateSource, output_dir: impl Into<PathBuf>, index: IndexStore) -> Self {
        Self {
            template,
            output_dir: output_dir.into(),
            index,
            on_collision: CollisionPolicy::default(),
            written: HashSet::new(),
        }
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.on_collision = policy;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn index(&self) -> &IndexStore {
        &self.index
    }

    /// Render the page HTML without writing anything
    pub fn render_html(&self, meta: &ArticleMetadata, fragment: &str) -> Result<String, RenderError> {
        let mut doc = self.template.parse()?;
        fill_document(&mut doc, meta, fragment)?;
        Ok(doc.to_html())
    }

    /// Render, write `{slug}.html` and append the index record
    pub fn render(
        &mut self,
        meta: &ArticleMetadata,
        fragment: &str,
    ) -> Result<RenderedArticle, RenderError> {
        let filename = output_filename(&meta.title);
        let output = self.output_dir.join(&filename);

        if self.written.contains(&output) {
            match self.on_collision {
                CollisionPolicy::Error => return Err(RenderError::SlugCollision(output)),
                CollisionPolicy::Overwrite => {
                    tracing::warn!("Overwriting {:?} written earlier in this run", output)
                }
            }
        }

        let html = self.render_html(meta, fragment)?;

        fs::create_dir_all(&self.output_dir).map_err(|source| RenderError::Write {
            path: self.output_dir.clone(),
            source,
        })?;
        fs::write(&output, html).map_err(|source| RenderError::Write {
            path: output.clone(),
            source,
        })?;

        let record = IndexRecord::new(meta, filename);
        self.index
            .append(&record)
            .map_err(|source| RenderError::Index {
                page: output.clone(),
                source,
            })?;
        self.written.insert(output.clone());

        tracing::info!("Rendered {:?} -> {:?}", meta.title, output);

        Ok(RenderedArticle {
            source: None,
            output,
            record,
        })
    }
}
