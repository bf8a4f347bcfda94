//! Project key extraction from pull request titles

use regex::Regex;

/// Return the first match of `pattern` in `title`, verbatim.
///
/// An empty first match counts as no key.
pub fn extract_key<'t>(title: &'t str, pattern: &Regex) -> Option<&'t str> {
    pattern
        .find(title)
        .map(|m| m.as_str())
        .filter(|key| !key.is_empty())
}
