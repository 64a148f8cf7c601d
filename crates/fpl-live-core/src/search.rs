// Player search for the pickers.

use crate::model::Element;

/// Result cap used by the dashboard pickers.
pub const DEFAULT_SEARCH_LIMIT: usize = 12;

/// Case-insensitive substring search over full name and `web_name`.
///
/// Returns at most `limit` matches in collection order. A blank query
/// returns nothing.
pub fn search<'a>(elements: &'a [Element], query: &str, limit: usize) -> Vec<&'a Element> {
    let term = query.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }

    elements
        .iter()
        .filter(|el| {
            el.full_name().to_lowercase().contains(&term)
                || el.web_name.to_lowercase().contains(&term)
        })
        .take(limit)
        .collect()
}
