//! Offset pagination shared by version listings and access log searches.

use serde::{Deserialize, Serialize};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 25;
/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// A 1-based page of a stable ordering.
///
/// Pages are restartable: the same request against unchanged data always
/// returns the same items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number, starting at 1.
    #[serde(default = "first_page")]
    pub page: u64,
    /// Items per page, at most [`MAX_PAGE_SIZE`].
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Build a request, clamping out-of-range values.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of items to skip.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.page_size
    }

    /// Number of items to return.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(first_page(), DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus navigation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T: Serialize> {
    /// Items on this page.
    pub items: Vec<T>,
    /// This page's number.
    pub page: u64,
    /// Requested page size.
    pub page_size: u64,
    /// Items across every page.
    pub total_items: u64,
    /// Number of pages; at least 1.
    pub total_pages: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

impl<T: Serialize> PageResponse<T> {
    /// Wrap one page of items fetched for `request`.
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(page_size.max(1)).max(1);
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }

    /// Cut the requested page out of an already ordered collection.
    pub fn from_slice(all: &[T], request: &PageRequest) -> Self
    where
        T: Clone,
    {
        let items = all
            .iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .cloned()
            .collect();
        Self::new(items, request.page, request.page_size, all.len() as u64)
    }
}

fn first_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_clamped() {
        let request = PageRequest::new(0, 5_000);
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, MAX_PAGE_SIZE);
        assert_eq!(request.offset(), 0);
        assert_eq!(PageRequest::new(4, 0).page_size, 1);
    }

    #[test]
    fn test_from_slice_pages_through_everything() {
        let all: Vec<u32> = (1..=7).collect();
        let second = PageResponse::from_slice(&all, &PageRequest::new(2, 3));
        assert_eq!(second.items, vec![4, 5, 6]);
        assert_eq!(second.total_pages, 3);
        assert!(second.has_next && second.has_previous);

        let last = PageResponse::from_slice(&all, &PageRequest::new(3, 3));
        assert_eq!(last.items, vec![7]);
        assert!(!last.has_next);

        let beyond = PageResponse::from_slice(&all, &PageRequest::new(9, 3));
        assert!(beyond.items.is_empty());
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let empty: Vec<u32> = Vec::new();
        let page = PageResponse::from_slice(&empty, &PageRequest::default());
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }
}
