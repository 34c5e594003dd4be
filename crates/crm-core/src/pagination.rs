//! Pagination types for list operations
//!
//! Lists are paged by 1-indexed page number and page size, and fetched from
//! storage as an inclusive row range.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page request (from query string)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a normalised request: page >= 1, page size in 1..=100
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Re-apply the bounds to a request that came straight from a client
    pub fn normalized(self) -> Self {
        Self::new(self.page, self.page_size)
    }

    /// Normalise with a custom maximum page size (still capped at 100)
    pub fn normalized_with_max(self, max_page_size: i64) -> Self {
        let max = max_page_size.clamp(1, MAX_PAGE_SIZE);
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, max),
        }
    }

    /// Zero-based offset of the first row
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Inclusive row range `(from, to)`
    pub fn range(&self) -> (i64, i64) {
        let from = self.offset();
        (from, from + self.page_size - 1)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn is_ascending(&self) -> bool {
        matches!(self, SortDirection::Asc)
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One page of a listing plus the total number of matching rows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total_count: i64, request: PageRequest) -> Self {
        Self {
            data,
            total_count,
            page: request.page,
            page_size: request.page_size,
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.page_size <= 0 {
            1
        } else {
            (self.total_count + self.page_size - 1) / self.page_size
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
        }
    }
}
