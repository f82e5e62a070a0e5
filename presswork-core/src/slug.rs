//! Output filename derivation from article titles.

/// Convert a title to the slug used for its output filename
///
/// Rules:
/// - Lowercase
/// - Each space becomes a hyphen
///
/// Nothing else is normalized: punctuation and unicode are kept and runs of
/// spaces give runs of hyphens.
///
/// # Examples
///
/// ```
/// use presswork_core::slugify;
///
/// assert_eq!(slugify("My Post"), "my-post");
/// assert_eq!(slugify("Big  News"), "big--news");
/// ```
pub fn slugify(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

/// Output filename for a title
pub fn output_filename(title: &str) -> String {
    format!("{}.html", slugify(title))
}
