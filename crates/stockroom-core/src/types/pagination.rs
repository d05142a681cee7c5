//! Pagination types for list queries.

use serde::{Deserialize, Serialize};

/// Page size used when the caller does not provide one.
pub const DEFAULT_PAGE_SIZE: u64 = 25;
/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Create a new page request, clamped to the default maximum page size.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self::bounded(page, page_size, MAX_PAGE_SIZE)
    }

    /// Create a new page request, clamped to `max_page_size`.
    pub fn bounded(page: u64, page_size: u64, max_page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, max_page_size.max(1)),
        }
    }

    /// The SQL `OFFSET` value, saturating at `i64::MAX`.
    ///
    /// Pages past the last row simply come back empty.
    pub fn offset(&self) -> i64 {
        let offset = self.page.saturating_sub(1).saturating_mul(self.page_size);
        i64::try_from(offset).unwrap_or(i64::MAX)
    }

    /// The SQL `LIMIT` value.
    pub fn limit(&self) -> i64 {
        i64::try_from(self.page_size).unwrap_or(i64::MAX)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The rows on this page.
    pub data: Vec<T>,
    /// Total number of rows across all pages.
    pub total: u64,
    /// Total number of pages; zero when there are no rows.
    pub total_pages: u64,
    /// Current page number (1-based).
    pub current_page: u64,
    /// Number of rows per page.
    pub page_size: u64,
}

impl<T> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(data: Vec<T>, request: &PageRequest, total: u64) -> Self {
        Self {
            data,
            total,
            total_pages: total.div_ceil(request.page_size),
            current_page: request.page,
            page_size: request.page_size,
        }
    }

    /// Create an empty response.
    pub fn empty(request: &PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Transform every row while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            total_pages: self.total_pages,
            current_page: self.current_page,
            page_size: self.page_size,
        }
    }

    /// Whether there is a page after this one.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_is_one_based() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_offset_saturates_for_huge_pages() {
        assert_eq!(PageRequest::new(u64::MAX, 100).offset(), i64::MAX);
        assert_eq!(PageRequest::new(u64::MAX / 50, 100).offset(), i64::MAX);

        let last_exact = PageRequest::new(i64::MAX as u64 / 100 + 1, 100);
        assert_eq!(last_exact.offset(), (i64::MAX / 100) * 100);
    }

    #[test]
    fn test_limit_fits_sql_bigint() {
        assert_eq!(PageRequest::new(1, 40).limit(), 40);
        assert_eq!(PageRequest::bounded(1, u64::MAX, u64::MAX).limit(), i64::MAX);
    }

    #[test]
    fn test_request_is_clamped() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 1);

        let req = PageRequest::bounded(2, 500, 50);
        assert_eq!(req.page_size, 50);
    }

    #[test]
    fn test_total_pages() {
        let req = PageRequest::new(1, 10);
        assert_eq!(PageResponse::<u8>::empty(&req).total_pages, 0);
        assert_eq!(PageResponse::new(vec![1u8], &req, 10).total_pages, 1);
        assert_eq!(PageResponse::new(vec![1u8], &req, 11).total_pages, 2);
    }

    #[test]
    fn test_serialized_shape() {
        let req = PageRequest::new(2, 5);
        let page = PageResponse::new(vec!["a"], &req, 6);
        let json = serde_json::to_value(&page).expect("serialize");
        assert_eq!(json["total_pages"], 2);
        assert_eq!(json["current_page"], 2);
        assert!(!page.has_next());
    }
}
