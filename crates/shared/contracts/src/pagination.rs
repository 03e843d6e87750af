//! Page/limit query parameters for post listings.

use domain::{DEFAULT_PAGE_LIMIT, DEFAULT_PAGE_NUMBER, MAX_PAGE_LIMIT};
use serde::{Deserialize, Serialize};

/// A clamped page request: `page >= 1`, `1 <= limit <= MAX_PAGE_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Zero-based offset of the first item.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn next(&self) -> Self {
        Self::new(self.page.saturating_add(1), self.limit)
    }

    /// Query pairs in the order the backend documents them.
    pub fn query(&self) -> [(&'static str, String); 2] {
        [
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page() {
        let page = PageRequest::default();
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 10);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        assert_eq!(PageRequest::new(0, 10).page(), 1);
        assert_eq!(PageRequest::new(1, 0).limit(), 1);
        assert_eq!(PageRequest::new(1, 101).limit(), 100);
        assert_eq!(PageRequest::new(3, 1000).offset(), 200);
    }

    #[test]
    fn test_query_pairs() {
        let query = PageRequest::new(2, 20).query();
        assert_eq!(query[0], ("page", "2".to_string()));
        assert_eq!(query[1], ("limit", "20".to_string()));
        assert_eq!(PageRequest::new(2, 20).next().page(), 3);
    }
}
