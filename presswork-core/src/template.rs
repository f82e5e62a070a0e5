//! Newspaper template loading and an owned, mutable HTML tree.
//!
//! The template text is read once into a [`TemplateSource`]; every article
//! parses its own [`Document`] from it, mutates it, serializes it and drops
//! it. Nothing is shared between articles.

use crate::markup::{self, PLACEHOLDER, RAW_TEXT_ELEMENTS, VOID_ELEMENTS};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to load template {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse HTML: {0}")]
    Parse(String),
}

/// Raw template text, loaded once and parsed per article
#[derive(Debug, Clone)]
pub struct TemplateSource {
    path: Option<PathBuf>,
    html: String,
}

impl TemplateSource {
    /// Read the template file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let html = fs::read_to_string(path).map_err(|source| TemplateError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded template {:?} ({} bytes)", path, html.len());
        Ok(Self {
            path: Some(path.to_path_buf()),
            html,
        })
    }

    /// Use in-memory template text
    pub fn from_string(html: impl Into<String>) -> Self {
        Self {
            path: None,
            html: html.into(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    /// Parse a fresh, independent document tree
    pub fn parse(&self) -> Result<Document, TemplateError> {
        Document::parse(&self.html)
    }
}

/// A node of the owned HTML tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Text exactly as it appears in HTML source (already escaped)
    Text(String),
    /// A comment or declaration such as `<!DOCTYPE html>`, written back as is
    Verbatim(String),
}

impl Node {
    fn write_html(&self, out: &mut String) {
        match self {
            Node::Element(element) => element.write_html(out),
            Node::Text(text) | Node::Verbatim(text) => out.push_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Attribute values are stored HTML-escaped
    pub attrs: Vec<(String, Option<String>)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Raw (escaped) value of an attribute; `Some("")` for bare attributes
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_deref().unwrap_or(""))
    }

    /// Set an attribute, escaping `value`
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let escaped = escape_attr(value);
        match self
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = Some(escaped),
            None => self.attrs.push((name.to_string(), Some(escaped))),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    /// Replace all children with a single escaped text node
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![Node::Text(escape_text(text))];
    }

    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    pub fn append_children(&mut self, nodes: impl IntoIterator<Item = Node>) {
        self.children.extend(nodes);
    }

    /// Concatenated text content, still escaped
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Serialized children
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.write_html(&mut out);
        }
        out
    }

    fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            if let Some(value) = value {
                // Values parsed from single-quoted source may hold a literal '"'
                let quote = if value.contains('"') { '\'' } else { '"' };
                out.push('=');
                out.push(quote);
                out.push_str(value);
                out.push(quote);
            }
        }
        out.push('>');

        for child in &self.children {
            child.write_html(out);
        }

        if !self.is_void() {
            out.push_str("</");
            out.push_str(&self.name);
            out.push('>');
        }
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => collect_text(&element.children, out),
            Node::Verbatim(_) => {}
        }
    }
}

/// A parsed HTML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn parse(html: &str) -> Result<Self, TemplateError> {
        Ok(Self {
            nodes: parse_fragment(html)?,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// First element (depth-first) whose class list contains `class`
    pub fn find_class_mut(&mut self, class: &str) -> Option<&mut Element> {
        find_mut(&mut self.nodes, &|el: &Element| el.has_class(class))
    }

    /// First element (depth-first) with the given tag name
    pub fn find_tag_mut(&mut self, tag: &str) -> Option<&mut Element> {
        find_mut(&mut self.nodes, &|el: &Element| el.name.eq_ignore_ascii_case(tag))
    }

    pub fn find_class(&self, class: &str) -> Option<&Element> {
        find(&self.nodes, &|el: &Element| el.has_class(class))
    }

    pub fn find_tag(&self, tag: &str) -> Option<&Element> {
        find(&self.nodes, &|el: &Element| el.name.eq_ignore_ascii_case(tag))
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out);
        }
        out
    }
}

fn find_mut<'a, F>(nodes: &'a mut [Node], pred: &F) -> Option<&'a mut Element>
where
    F: Fn(&Element) -> bool,
{
    for node in nodes.iter_mut() {
        if let Node::Element(element) = node {
            if pred(element) {
                return Some(element);
            }
            if let Some(found) = find_mut(&mut element.children, pred) {
                return Some(found);
            }
        }
    }
    None
}

fn find<'a, F>(nodes: &'a [Node], pred: &F) -> Option<&'a Element>
where
    F: Fn(&Element) -> bool,
{
    for node in nodes {
        if let Node::Element(element) = node {
            if pred(element) {
                return Some(element);
            }
            if let Some(found) = find(&element.children, pred) {
                return Some(found);
            }
        }
    }
    None
}

/// Parse an HTML fragment into owned nodes
pub fn parse_fragment(html: &str) -> Result<Vec<Node>, TemplateError> {
    let normalized = markup::normalize(html);
    let dom = tl::parse(&normalized.html, tl::ParserOptions::default())
        .map_err(|e| TemplateError::Parse(format!("{:?}", e)))?;

    let mut builder = TreeBuilder {
        parser: dom.parser(),
        verbatim: normalized.verbatim.into(),
        raw_text: normalized.raw_text.into(),
    };
    Ok(dom
        .children()
        .iter()
        .filter_map(|handle| builder.convert(*handle))
        .collect())
}

/// Turns `tl` nodes into owned ones, putting back the pieces the
/// normalizer lifted out (in the order it lifted them)
struct TreeBuilder<'p, 'a> {
    parser: &'p tl::Parser<'a>,
    verbatim: VecDeque<String>,
    raw_text: VecDeque<String>,
}

impl TreeBuilder<'_, '_> {
    fn convert(&mut self, handle: tl::NodeHandle) -> Option<Node> {
        let parser = self.parser;
        match handle.get(parser)? {
            tl::Node::Tag(tag) => {
                let name = tag.name().as_utf8_str().to_lowercase();
                if name == PLACEHOLDER {
                    return self.verbatim.pop_front().map(Node::Verbatim);
                }

                let attrs = tag
                    .attributes()
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.map(|v| v.to_string())))
                    .collect();

                let children = if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                    self.raw_text
                        .pop_front()
                        .filter(|text| !text.is_empty())
                        .map(Node::Text)
                        .into_iter()
                        .collect()
                } else {
                    tag.children()
                        .top()
                        .iter()
                        .filter_map(|child| self.convert(*child))
                        .collect()
                };

                Some(Node::Element(Element {
                    name,
                    attrs,
                    children,
                }))
            }
            tl::Node::Raw(bytes) => Some(Node::Text(bytes.as_utf8_str().into_owned())),
            // The normalizer leaves no comments behind
            tl::Node::Comment(_) => None,
        }
    }
}

pub fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attr(input: &str) -> String {
    escape_text(input).replace('"', "&quot;")
}
