//! Heading rewriting applied to article bodies before CommonMark rendering.
//!
//! Articles mark headings with `#` characters, but not as ATX headings: the
//! level is the number of `#` characters anywhere on the line. A line with
//! `n` hashes has its first run of exactly `n` hashes replaced by `<hN>`,
//! everything from the last remaining `#` onwards dropped, and `</hN>`
//! appended. The injected tags reach the output as raw HTML.

/// Rewrite every `#`-bearing line of `body` into an explicit heading tag.
///
/// Lines without `#` are untouched, so a body without any `#` comes back
/// unchanged.
///
/// ```
/// use presswork_core::heading::transform;
///
/// assert_eq!(transform("## Title"), "<h2>Title</h2>");
/// assert_eq!(transform("plain text"), "plain text");
/// ```
pub fn transform(body: &str) -> String {
    if !body.contains('#') {
        return body.to_string();
    }

    let lines: Vec<&str> = body.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        let (content, cr) = match line.strip_suffix('\r') {
            Some(stripped) => (stripped, "\r"),
            None => (*line, ""),
        };

        let Some(heading) = transform_line(content) else {
            out.push(line.to_string());
            continue;
        };

        out.push(format!("{}{}", heading.text, cr));

        // An HTML block only ends at a blank line; keep what follows as markdown.
        let next_has_text = lines
            .get(idx + 1)
            .is_some_and(|next| !next.trim().is_empty());
        if heading.starts_block && next_has_text {
            out.push(cr.to_string());
        }
    }

    out.join("\n")
}

#[derive(Debug, PartialEq, Eq)]
struct Heading {
    text: String,
    /// The opening tag is the first thing on the line
    starts_block: bool,
}

fn transform_line(line: &str) -> Option<Heading> {
    let level = line.matches('#').count();
    if level == 0 {
        return None;
    }

    let marker = "#".repeat(level);
    let (replaced, starts_block) = match line.find(&marker) {
        Some(pos) => {
            let (before, after) = line.split_at(pos);
            let rest = after[level..].trim_start();
            (
                format!("{}<h{}>{}", before, level, rest),
                before.trim().is_empty(),
            )
        }
        None => (line.to_string(), false),
    };

    let kept = match replaced.rfind('#') {
        Some(pos) => &replaced[..pos],
        None => replaced.as_str(),
    };

    Some(Heading {
        text: format!("{}</h{}>", kept, level),
        starts_block,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_without_hashes() {
        let body = "First line\n\nSecond *line* with [a link](https://example.com).\n";
        assert_eq!(transform(body), body);
        assert_eq!(transform(""), "");
    }

    #[test]
    fn test_levels() {
        assert_eq!(transform("# One"), "<h1>One</h1>");
        assert_eq!(transform("## Title"), "<h2>Title</h2>");
        assert_eq!(transform("###### Six"), "<h6>Six</h6>");
    }

    #[test]
    fn test_hash_anywhere_counts() {
        // A lone mid-sentence hash still becomes a heading
        assert_eq!(transform("We are #1"), "We are <h1>1</h1>");
    }

    #[test]
    fn test_disjoint_groups_only_lose_trailing_part() {
        // Two hashes, but no run of two: nothing replaced, tail after last '#' dropped
        assert_eq!(transform("# Title #"), "# Title </h2>");
        assert_eq!(transform("a # b # c"), "a # b </h2>");
    }

    #[test]
    fn test_closing_hashes_change_level() {
        assert_eq!(transform("## Title ##"), "## Title #</h4>");
    }

    #[test]
    fn test_blank_line_inserted_after_block_heading() {
        insta::assert_snapshot!(transform("# Hi\nSome *text*."), @r"
<h1>Hi</h1>

Some *text*.
");
    }

    #[test]
    fn test_no_extra_blank_line_when_already_separated() {
        assert_eq!(
            transform("# Hi\n\nSome text."),
            "<h1>Hi</h1>\n\nSome text."
        );
        assert_eq!(transform("text\n## End"), "text\n<h2>End</h2>");
    }

    #[test]
    fn test_inline_heading_does_not_split_paragraph() {
        assert_eq!(
            transform("We are #1\nstill here"),
            "We are <h1>1</h1>\nstill here"
        );
    }

    #[test]
    fn test_crlf_preserved() {
        assert_eq!(
            transform("# Hi\r\nText\r\n"),
            "<h1>Hi</h1>\r\n\r\nText\r\n"
        );
    }

    #[test]
    fn test_transform_line_reports_block_start() {
        assert_eq!(
            transform_line("  # Indented"),
            Some(Heading {
                text: "  <h1>Indented</h1>".to_string(),
                starts_block: true,
            })
        );
        assert_eq!(transform_line("plain"), None);
    }
}
