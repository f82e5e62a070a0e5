//! Markdown rendering of article bodies.

use crate::heading;
use pulldown_cmark::{html, Options, Parser};

/// CommonMark processor applying the heading rewrite before rendering
pub struct MarkdownProcessor {
    options: Options,
}

impl MarkdownProcessor {
    pub fn new() -> Self {
        // Plain CommonMark: no tables, footnotes or other extensions
        Self {
            options: Options::empty(),
        }
    }

    /// Rewrite headings in `body` and render the result to an HTML fragment
    pub fn convert(&self, body: &str) -> String {
        let transformed = heading::transform(body);
        self.render(&transformed)
    }

    /// Render markdown as-is; raw HTML passes through untouched
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, parser);
        html_output
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_and_paragraph() {
        let processor = MarkdownProcessor::new();
        let html = processor.convert("# Hi\nSome *text*.");

        assert!(html.contains("<h1>Hi</h1>"), "got: {}", html);
        assert!(html.contains("<p>Some <em>text</em>.</p>"), "got: {}", html);
    }

    #[test]
    fn test_plain_markdown_unaffected() {
        let processor = MarkdownProcessor::new();
        let html = processor.convert("Hello [world](https://example.com)");
        assert_eq!(
            html,
            "<p>Hello <a href=\"https://example.com\">world</a></p>\n"
        );
    }

    #[test]
    fn test_raw_html_passthrough() {
        let processor = MarkdownProcessor::new();
        let html = processor.render("<h2>Raw</h2>\n");
        assert_eq!(html, "<h2>Raw</h2>\n");
    }

    #[test]
    fn test_extensions_disabled() {
        let processor = MarkdownProcessor::new();
        let html = processor.render("~~gone~~");
        assert!(!html.contains("<del>"));
    }
}
