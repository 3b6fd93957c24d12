//! Feed item validation for gator.

use crate::rss::types::ParsedItem;

/// Filter out malformed items from a parsed feed.
///
/// An item is kept when at least one of title, link, description, or
/// pubDate is present. Invalid items are dropped silently; a feed
/// containing some invalid items is not an error.
pub fn filter_valid(items: Vec<ParsedItem>) -> Vec<ParsedItem> {
    items.into_iter().filter(|item| item.has_any_field()).collect()
}
