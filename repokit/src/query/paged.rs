//! One page of query results
//!
//! # Example
//!
//! ```rust
//! use repokit::query::PagedResult;
//!
//! let page = PagedResult::new(1, 10, Some(vec!["k", "l"]), 12);
//! assert_eq!(page.total_pages(), 2);
//! assert!(page.has_previous_page());
//! assert!(!page.has_next_page());
//! ```

use serde::{Deserialize, Serialize};

use super::rules::PageRule;

/// A page of items plus the size of the whole result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    page_index: i64,
    page_size: i64,
    items: Vec<T>,
    total_count: u64,
}

impl<T> PagedResult<T> {
    /// Build a page
    ///
    /// An absent item source yields an empty page. Items beyond a positive
    /// `page_size` are dropped, and `total_count` is raised to at least the
    /// number of items kept on the page.
    #[must_use]
    pub fn new(page_index: i64, page_size: i64, items: Option<Vec<T>>, total_count: u64) -> Self {
        let mut items = items.unwrap_or_default();
        if let Ok(limit) = usize::try_from(page_size) {
            if limit > 0 && items.len() > limit {
                tracing::warn!(
                    page_size,
                    received = items.len(),
                    "page holds more items than its size, truncating"
                );
                items.truncate(limit);
            }
        }
        let total_count = total_count.max(items.len() as u64);
        Self {
            page_index,
            page_size,
            items,
            total_count,
        }
    }

    /// Build the page described by `page`
    #[must_use]
    pub fn for_page(page: PageRule, items: Vec<T>, total_count: u64) -> Self {
        Self::new(page.index, page.size, Some(items), total_count)
    }

    /// A page with no items and a total of zero
    #[must_use]
    pub fn empty(page: PageRule) -> Self {
        Self::new(page.index, page.size, None, 0)
    }

    /// Zero-based page number
    pub fn page_index(&self) -> i64 {
        self.page_index
    }

    /// Requested entities per page
    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Items on this page
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Take ownership of the items
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Items across all pages
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Whether this page holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of pages needed for `total_count` items; zero for an invalid size
    pub fn total_pages(&self) -> u64 {
        let Ok(per_page) = u64::try_from(self.page_size) else {
            return 0;
        };
        if per_page == 0 {
            return 0;
        }
        // Ceiling division
        self.total_count.saturating_add(per_page).saturating_sub(1) / per_page
    }

    /// Whether a page precedes this one
    pub fn has_previous_page(&self) -> bool {
        self.page_index > 0
    }

    /// Whether a page follows this one
    pub fn has_next_page(&self) -> bool {
        match u64::try_from(self.page_index) {
            Ok(index) => index.saturating_add(1) < self.total_pages(),
            Err(_) => false,
        }
    }

    /// Convert every item, keeping the paging metadata
    pub fn map<U, F>(self, f: F) -> PagedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PagedResult {
            page_index: self.page_index,
            page_size: self.page_size,
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
        }
    }
}

impl<T> IntoIterator for PagedResult<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
