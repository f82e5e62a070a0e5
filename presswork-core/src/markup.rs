//! Source normalization ahead of `tl`.
//!
//! `tl` nests elements by explicit tags only and reads `<` inside
//! `<script>` as markup. [`normalize`] rewrites the source into a fully
//! balanced form that `tl` can take literally:
//!
//! - elements whose end tag HTML lets you omit (`li`, `p`, `td`, `tr`,
//!   `option` and friends) are closed where a browser would close them;
//! - end tags with no open element are dropped, and unclosed elements are
//!   closed at the end of input;
//! - the contents of raw-text elements are lifted out unchanged;
//! - comments, the doctype and other `<!...>` / `<?...>` declarations are
//!   swapped for an empty placeholder element.
//!
//! Lifted pieces are returned in source order, and the tree builder puts
//! them back in the same order.

/// Elements that never carry a closing tag
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose contents are text up to the matching end tag
pub(crate) const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Stands in for a comment or declaration in the normalized source
pub(crate) const PLACEHOLDER: &str = "x-presswork-verbatim";

/// Start tags that close an open `<p>`
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "dialog", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hgroup", "hr", "li", "main", "menu", "nav", "ol", "p", "pre", "section", "table",
    "ul",
];

/// A `<p>` inside one of these is out of reach of an implied close
const P_SCOPE: &[&str] = &[
    "applet", "button", "caption", "html", "marquee", "object", "table", "td", "template", "th",
];

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Normalized {
    pub html: String,
    /// Comments and declarations, one per placeholder
    pub verbatim: Vec<String>,
    /// Raw-text element contents, one per raw-text element
    pub raw_text: Vec<String>,
}

pub(crate) fn normalize(source: &str) -> Normalized {
    let mut normalizer = Normalizer {
        src: source,
        pos: 0,
        stack: Vec::new(),
        out: Normalized::default(),
    };
    normalizer.run();
    normalizer.out
}

struct Normalizer<'s> {
    src: &'s str,
    pos: usize,
    stack: Vec<String>,
    out: Normalized,
}

impl Normalizer<'_> {
    fn run(&mut self) {
        let src = self.src;
        while self.pos < src.len() {
            let rest = &src[self.pos..];
            if let Some(body) = rest.strip_prefix("<!--") {
                let end = body.find("-->").map_or(rest.len(), |i| i + "<!--".len() + 3);
                self.verbatim(end);
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                let end = rest.find('>').map_or(rest.len(), |i| i + 1);
                self.verbatim(end);
            } else if rest.starts_with("</") {
                match (tag_name(rest, 2), tag_end(rest)) {
                    (Some(name), Some(end)) => {
                        let name = name.to_ascii_lowercase();
                        self.pos += end;
                        self.end_tag(&name);
                    }
                    _ => self.stray_lt(),
                }
            } else if rest.starts_with('<') {
                match (tag_name(rest, 1), tag_end(rest)) {
                    (Some(name), Some(end)) => {
                        let name = name.to_ascii_lowercase();
                        self.start_tag(&rest[..end], name);
                    }
                    _ => self.stray_lt(),
                }
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                self.out.html.push_str(&rest[..end]);
                self.pos += end;
            }
        }
        self.close_to(0);
    }

    fn stray_lt(&mut self) {
        self.out.html.push_str("&lt;");
        self.pos += 1;
    }

    fn verbatim(&mut self, len: usize) {
        let piece = &self.src[self.pos..self.pos + len];
        self.out.verbatim.push(piece.to_string());
        self.out.html.push('<');
        self.out.html.push_str(PLACEHOLDER);
        self.out.html.push_str("></");
        self.out.html.push_str(PLACEHOLDER);
        self.out.html.push('>');
        self.pos += len;
    }

    fn start_tag(&mut self, tag: &str, name: String) {
        self.pos += tag.len();
        self.close_implied(&name);

        let inner = tag[..tag.len() - 1].trim_end();
        if VOID_ELEMENTS.contains(&name.as_str()) {
            self.out.html.push_str(inner.trim_end_matches('/').trim_end());
            self.out.html.push_str(" />");
        } else if inner.ends_with('/') {
            self.out.html.push_str(tag);
        } else if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.out.html.push_str(tag);
            self.raw_text(&name);
        } else {
            self.out.html.push_str(tag);
            self.stack.push(name);
        }
    }

    /// Lift everything up to `</name` and consume the end tag
    fn raw_text(&mut self, name: &str) {
        let rest = &self.src[self.pos..];
        let close = find_end_tag(rest, name);
        let content_end = close.unwrap_or(rest.len());
        self.out.raw_text.push(rest[..content_end].to_string());
        self.pos += content_end;

        if close.is_some() {
            let rest = &self.src[self.pos..];
            self.pos += tag_end(rest).unwrap_or(rest.len());
        }
        self.push_end_tag(name);
    }

    fn end_tag(&mut self, name: &str) {
        if let Some(idx) = self.stack.iter().rposition(|open| open == name) {
            self.close_to(idx);
        } else {
            tracing::trace!("Dropping stray </{}>", name);
        }
    }

    fn close_implied(&mut self, name: &str) {
        match name {
            "li" => self.close_open(&["li"], &["ul", "ol", "menu"]),
            "dt" | "dd" => self.close_open(&["dt", "dd"], &["dl"]),
            "option" => self.close_open(&["option"], &["select", "datalist", "optgroup"]),
            "optgroup" => {
                self.close_open(&["option"], &["select", "datalist", "optgroup"]);
                self.close_open(&["optgroup"], &["select"]);
            }
            "tr" => self.close_open(&["tr"], &["table", "thead", "tbody", "tfoot"]),
            "td" | "th" => self.close_open(&["td", "th"], &["tr", "table"]),
            "thead" | "tbody" | "tfoot" => {
                self.close_open(&["thead", "tbody", "tfoot"], &["table"])
            }
            "body" => self.close_open(&["head"], &["html"]),
            _ => {}
        }
        if CLOSES_P.contains(&name) {
            self.close_open(&["p"], P_SCOPE);
        }
    }

    /// Close the innermost open `targets` element unless a `stops`
    /// element is open inside it
    fn close_open(&mut self, targets: &[&str], stops: &[&str]) {
        for idx in (0..self.stack.len()).rev() {
            let open = self.stack[idx].as_str();
            if targets.contains(&open) {
                self.close_to(idx);
                return;
            }
            if stops.contains(&open) {
                return;
            }
        }
    }

    /// Emit end tags until the stack is `depth` long
    fn close_to(&mut self, depth: usize) {
        while self.stack.len() > depth {
            if let Some(name) = self.stack.pop() {
                self.push_end_tag(&name);
            }
        }
    }

    fn push_end_tag(&mut self, name: &str) {
        self.out.html.push_str("</");
        self.out.html.push_str(name);
        self.out.html.push('>');
    }
}

/// Tag name starting at byte `start` of `s`, if one starts there
fn tag_name(s: &str, start: usize) -> Option<&str> {
    let rest = s.get(start..)?;
    if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_'))
        .unwrap_or(rest.len());
    Some(&rest[..len])
}

/// Byte length of the tag opening `s`, through its `>`
fn tag_end(s: &str) -> Option<usize> {
    let mut quote = None;
    for (i, b) in s.bytes().enumerate().skip(1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i + 1),
            None => {}
        }
    }
    None
}

/// Offset of the `</name` that ends a raw-text element
fn find_end_tag(s: &str, name: &str) -> Option<usize> {
    let lower = s.to_ascii_lowercase();
    let needle = format!("</{}", name);
    let mut from = 0;
    while let Some(found) = lower[from..].find(&needle) {
        let at = from + found;
        let next = lower.as_bytes().get(at + needle.len());
        if !next.is_some_and(|b| !(b.is_ascii_whitespace() || *b == b'>' || *b == b'/')) {
            return Some(at);
        }
        from = at + needle.len();
    }
    None
}
