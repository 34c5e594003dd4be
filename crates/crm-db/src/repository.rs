//! Shared repository types

use crm_core::error::CrmError;
use crm_core::pagination::{Page, PageRequest};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stored value could not be mapped onto the domain model
    #[error("Invalid stored value: {0}")]
    Decode(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for CrmError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => CrmError::NotFound {
                entity: "Record",
                id: what,
            },
            RepositoryError::Conflict(message) => CrmError::conflict(message),
            RepositoryError::Database(e) => CrmError::storage(e.to_string()),
            RepositoryError::Decode(message) => CrmError::storage(message),
        }
    }
}

/// Pagination parameters for queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    pub fn page(page: i64, per_page: i64) -> Self {
        Self {
            limit: per_page,
            offset: (page - 1) * per_page,
        }
    }
}

impl From<PageRequest> for Pagination {
    fn from(request: PageRequest) -> Self {
        Self::new(request.limit(), request.offset())
    }
}

/// Query result with pagination metadata
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            limit: pagination.limit,
            offset: pagination.offset,
        }
    }

    pub fn page(&self) -> i64 {
        if self.limit == 0 {
            1
        } else {
            (self.offset / self.limit) + 1
        }
    }

    pub fn has_next(&self) -> bool {
        self.offset + self.limit < self.total
    }

    pub fn into_page(self) -> Page<T> {
        let request = PageRequest {
            page: self.page(),
            page_size: self.limit,
        };
        Page::new(self.items, self.total, request)
    }
}
