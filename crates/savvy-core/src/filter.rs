//! Client-side filtering and search
//!
//! Filtering is a pure function of (links, filter) -> subset. The list
//! screen combines a type filter, a read-status filter, and an optional
//! category; the search screen is a substring match over title, URL, and
//! description.

use uuid::Uuid;

use crate::models::{Link, LinkType};

/// Read-status filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadFilter {
    /// Show everything
    #[default]
    All,
    /// Only links marked read
    Read,
    /// Only unread links
    Unread,
}

impl ReadFilter {
    fn matches(&self, link: &Link) -> bool {
        match self {
            ReadFilter::All => true,
            ReadFilter::Read => link.is_read,
            ReadFilter::Unread => !link.is_read,
        }
    }
}

/// Combined filter for the link list
///
/// All set fields must match (intersection semantics).
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    /// Restrict to a content type
    pub kind: Option<LinkType>,
    /// Restrict by read status
    pub read: ReadFilter,
    /// Restrict to a category
    pub category_id: Option<Uuid>,
    /// Substring query over title, URL, and description
    pub query: Option<String>,
}

impl LinkFilter {
    /// Filter matching everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether a single link passes this filter
    pub fn matches(&self, link: &Link) -> bool {
        if let Some(kind) = self.kind {
            if link.kind != kind {
                return false;
            }
        }
        if !self.read.matches(link) {
            return false;
        }
        if let Some(category_id) = self.category_id {
            if !link.in_category(category_id) {
                return false;
            }
        }
        if let Some(ref query) = self.query {
            if !matches_query(link, query) {
                return false;
            }
        }
        true
    }
}

/// Apply a filter, preserving input order
pub fn filter_links<'a>(links: &'a [Link], filter: &LinkFilter) -> Vec<&'a Link> {
    links.iter().filter(|link| filter.matches(link)).collect()
}

/// Search by case-insensitive substring over title, URL, and description
///
/// A blank query matches everything.
pub fn search_links<'a>(links: &'a [Link], query: &str) -> Vec<&'a Link> {
    links
        .iter()
        .filter(|link| matches_query(link, query))
        .collect()
}

fn matches_query(link: &Link, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    link.title.to_lowercase().contains(&query)
        || link.url.to_lowercase().contains(&query)
        || link
            .description
            .as_deref()
            .map(|d| d.to_lowercase().contains(&query))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn sample_links() -> (Vec<Link>, Uuid) {
        let cat = Category::new("Tech", "#0A84FF");

        let mut a = Link::new("https://blog.example.com/rust-intro");
        a.set_title("Rust introduction");
        a.add_category(cat.id);

        let mut b = Link::new("https://www.youtube.com/watch?v=xyz");
        b.set_title("Conference talk");
        b.mark_read();

        let mut c = Link::new("https://example.com/cooking");
        c.set_title("Pasta recipes");
        c.set_description(Some("Weeknight pasta ideas".to_string()));

        (vec![a, b, c], cat.id)
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let (links, _) = sample_links();
        assert_eq!(filter_links(&links, &LinkFilter::all()).len(), 3);
    }

    #[test]
    fn test_filter_by_kind() {
        let (links, _) = sample_links();
        let filter = LinkFilter {
            kind: Some(LinkType::Video),
            ..Default::default()
        };
        let out = filter_links(&links, &filter);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Conference talk");
    }

    #[test]
    fn test_filter_by_read_status() {
        let (links, _) = sample_links();

        let read = LinkFilter {
            read: ReadFilter::Read,
            ..Default::default()
        };
        assert_eq!(filter_links(&links, &read).len(), 1);

        let unread = LinkFilter {
            read: ReadFilter::Unread,
            ..Default::default()
        };
        assert_eq!(filter_links(&links, &unread).len(), 2);
    }

    #[test]
    fn test_filter_by_category() {
        let (links, cat) = sample_links();
        let filter = LinkFilter {
            category_id: Some(cat),
            ..Default::default()
        };
        let out = filter_links(&links, &filter);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Rust introduction");

        let none = LinkFilter {
            category_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(filter_links(&links, &none).is_empty());
    }

    #[test]
    fn test_filters_compose_by_intersection() {
        let (links, cat) = sample_links();
        // The only link in the category is unread, so read+category is empty
        let filter = LinkFilter {
            read: ReadFilter::Read,
            category_id: Some(cat),
            ..Default::default()
        };
        assert!(filter_links(&links, &filter).is_empty());

        let filter = LinkFilter {
            read: ReadFilter::Unread,
            category_id: Some(cat),
            ..Default::default()
        };
        assert_eq!(filter_links(&links, &filter).len(), 1);
    }

    #[test]
    fn test_search_title_url_description() {
        let (links, _) = sample_links();

        // Title match, case-insensitive
        assert_eq!(search_links(&links, "RUST").len(), 1);
        // URL match
        assert_eq!(search_links(&links, "youtube").len(), 1);
        // Description match
        assert_eq!(search_links(&links, "weeknight").len(), 1);
        // No match
        assert!(search_links(&links, "gardening").is_empty());
    }

    #[test]
    fn test_blank_query_matches_everything() {
        let (links, _) = sample_links();
        assert_eq!(search_links(&links, "").len(), 3);
        assert_eq!(search_links(&links, "   ").len(), 3);
    }

    #[test]
    fn test_filter_is_pure() {
        let (links, _) = sample_links();
        let filter = LinkFilter {
            query: Some("rust".to_string()),
            ..Default::default()
        };
        let first = filter_links(&links, &filter);
        let second = filter_links(&links, &filter);
        assert_eq!(first, second);
        // Input untouched
        assert_eq!(links.len(), 3);
    }
}
