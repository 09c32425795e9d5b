//! Page cursor for mid-term resumption

/// Names the term that was mid-pagination when a run stopped, and the page
/// to resume it from
///
/// At most one cursor exists at a time. It is only honored when the term about
/// to be paged matches `term` exactly, so a cursor left behind for a term that
/// later completed is harmless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub term: String,

    /// 1-based page number
    pub page: u32,
}

impl PageCursor {
    pub fn new(term: impl Into<String>, page: u32) -> Self {
        Self {
            term: term.into(),
            page: page.max(1),
        }
    }

    /// Returns the page to start `term` from given an optional stored cursor
    pub fn start_page(cursor: Option<&PageCursor>, term: &str) -> u32 {
        match cursor {
            Some(c) if c.term == term => c.page,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_page_matches_term() {
        let cursor = PageCursor::new("real", 3);
        assert_eq!(PageCursor::start_page(Some(&cursor), "real"), 3);
    }

    #[test]
    fn test_start_page_other_term_starts_fresh() {
        let cursor = PageCursor::new("real", 3);
        assert_eq!(PageCursor::start_page(Some(&cursor), "Real"), 1);
        assert_eq!(PageCursor::start_page(None, "real"), 1);
    }

    #[test]
    fn test_page_is_at_least_one() {
        assert_eq!(PageCursor::new("x", 0).page, 1);
    }
}
