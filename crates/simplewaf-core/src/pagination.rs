//! Pagination utilities for API responses.
//!
//! List endpoints accept `page` (1-indexed, default 1) and `pageSize`
//! (1-100, default 10) and answer with a [`Paginated`] body:
//!
//! ```json
//! {
//!   "results": [...],
//!   "totalCount": 42,
//!   "currentPage": 2,
//!   "pageSize": 10,
//!   "totalPages": 5
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::serde::deserialize_optional_i64;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for page-based pagination.
///
/// - `page` is clamped to a minimum of 1
/// - `pageSize` is clamped to the range [1, 100]
#[derive(Debug, Clone, Default, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page_size: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
        }
    }

    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Returns the effective page size, clamped to [1, 100].
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Rows to skip. Saturates for absurdly large page numbers, which then
    /// land past the end of any result set.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// One page of results plus the totals needed to render a pager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub results: Vec<T>,
    pub total_count: i64,
    pub current_page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(results: Vec<T>, total_count: i64, params: &PaginationParams) -> Self {
        let page_size = params.limit();
        let total_pages = if total_count == 0 {
            0
        } else {
            (total_count + page_size - 1) / page_size
        };

        Self {
            results,
            total_count,
            current_page: params.page(),
            page_size,
            total_pages,
        }
    }

    /// Paginates an already filtered, already ordered collection in memory.
    pub fn from_vec(items: Vec<T>, params: &PaginationParams) -> Self {
        let total = items.len() as i64;
        let page = items
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .collect();
        Self::new(page, total, params)
    }

    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            results: self.results.into_iter().map(f).collect(),
            total_count: self.total_count,
            current_page: self.current_page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}
