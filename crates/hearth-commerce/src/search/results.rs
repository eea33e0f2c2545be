//! Search results and pagination.

use serde::{Deserialize, Serialize};

/// Default page size for listings.
pub const DEFAULT_PER_PAGE: i64 = 24;
/// Largest page size a client may request.
pub const MAX_PER_PAGE: i64 = 100;

/// Pagination info.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: i64,
    /// Items per page.
    pub per_page: i64,
    /// Total number of items.
    pub total: i64,
    /// Total number of pages.
    pub total_pages: i64,
    /// Whether there's a next page.
    pub has_next: bool,
    /// Whether there's a previous page.
    pub has_prev: bool,
}

impl Pagination {
    /// Create pagination info. `page` is raised to 1 and `per_page`
    /// clamped to `1..=MAX_PER_PAGE`.
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let total = total.max(0);
        let total_pages = if total == 0 {
            1
        } else {
            (total + per_page - 1) / per_page
        };

        Self {
            page,
            per_page,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Get the offset of the first item on this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// Check if on last page.
    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }

    /// Take this page out of a fully filtered and sorted list.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.per_page as usize)
            .collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE, 0)
    }
}

/// Search results container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults<T> {
    /// The result items.
    pub items: Vec<T>,
    /// Pagination info.
    pub pagination: Pagination,
}

impl<T> SearchResults<T> {
    /// Paginate a complete result list.
    pub fn paginate(all: Vec<T>, page: i64, per_page: i64) -> Self {
        let pagination = Pagination::new(page, per_page, all.len() as i64);
        Self {
            items: pagination.slice(all),
            pagination,
        }
    }

    /// Create empty results.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::default(),
        }
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
