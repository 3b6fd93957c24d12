//! RSS types for gator.

/// Parsed channel data from a feed document.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    /// Channel title.
    pub title: String,
    /// Channel link.
    pub link: String,
    /// Channel description.
    pub description: String,
    /// Parsed items, in document order.
    pub items: Vec<ParsedItem>,
}

/// Parsed item data from a feed document.
///
/// Every field is optional; validity is decided by the validator, not
/// at the parsing boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedItem {
    /// Item title.
    pub title: Option<String>,
    /// Link to the original article.
    pub link: Option<String>,
    /// Item description/summary.
    pub description: Option<String>,
    /// Raw publication date string, as it appeared in the document.
    pub pub_date: Option<String>,
}

impl ParsedItem {
    /// Check whether at least one field is present.
    pub fn has_any_field(&self) -> bool {
        self.title.is_some()
            || self.link.is_some()
            || self.description.is_some()
            || self.pub_date.is_some()
    }
}
