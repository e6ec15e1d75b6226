//! Offset-based pagination utilities.

use serde::{Deserialize, Serialize};

/// Default page size when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on page size to keep list queries cheap.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Normalized pagination parameters.
///
/// Pages are zero-based. Out-of-range input is clamped rather than rejected:
/// a negative page becomes 0, a size outside `1..=MAX_PAGE_SIZE` becomes the
/// default/maximum respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub size: i64,
}

impl PageParams {
    /// Builds normalized parameters from raw (possibly absent) query values.
    pub fn new(page: Option<i64>, size: Option<i64>) -> Self {
        let page = page.unwrap_or(0).max(0);
        let size = match size {
            Some(s) if s < 1 => DEFAULT_PAGE_SIZE,
            Some(s) => s.min(MAX_PAGE_SIZE),
            None => DEFAULT_PAGE_SIZE,
        };
        Self { page, size }
    }

    /// Row offset for a `LIMIT/OFFSET` query.
    pub fn offset(&self) -> i64 {
        self.page * self.size
    }

    /// Row limit for a `LIMIT/OFFSET` query.
    pub fn limit(&self) -> i64 {
        self.size
    }
}

/// A single page of results plus paging metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Assembles a page envelope from query results and a total row count.
    pub fn new(items: Vec<T>, params: PageParams, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + params.size - 1) / params.size
        };
        Self {
            items,
            page: params.page,
            size: params.size,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let params = PageParams::new(None, None);
        assert_eq!(params.page, 0);
        assert_eq!(params.size, DEFAULT_PAGE_SIZE);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_negative_page_clamped_to_zero() {
        let params = PageParams::new(Some(-3), Some(10));
        assert_eq!(params.page, 0);
        assert_eq!(params.size, 10);
    }

    #[test]
    fn test_zero_size_falls_back_to_default() {
        let params = PageParams::new(Some(0), Some(0));
        assert_eq!(params.size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_oversized_page_clamped_to_max() {
        let params = PageParams::new(Some(0), Some(10_000));
        assert_eq!(params.size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset_computation() {
        let params = PageParams::new(Some(3), Some(25));
        assert_eq!(params.offset(), 75);
        assert_eq!(params.limit(), 25);
    }

    #[test]
    fn test_page_envelope_rounds_total_pages_up() {
        let params = PageParams::new(Some(0), Some(20));
        let page = Page::new(vec![1, 2, 3], params, 41);
        assert_eq!(page.total, 41);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_page_envelope_exact_division() {
        let params = PageParams::new(Some(1), Some(20));
        let page = Page::new(vec![0; 20], params, 40);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_empty_result_has_zero_pages() {
        let params = PageParams::new(None, None);
        let page: Page<i32> = Page::new(vec![], params, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_page_serializes_snake_case() {
        let params = PageParams::new(None, None);
        let page = Page::new(vec![7], params, 1);
        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains("\"total_pages\":1"));
        assert!(json.contains("\"items\":[7]"));
    }
}
