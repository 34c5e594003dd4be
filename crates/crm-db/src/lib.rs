//! # crm-db
//!
//! Storage layer for CRM RS.
//!
//! - Connection pool management
//! - Store traits, one per aggregate
//! - PostgreSQL repositories using SQLx
//! - In-memory stores with the same filtering, ordering and paging
//!
//! ## Example
//!
//! ```ignore
//! use crm_db::{Database, DatabaseConfig, LeadRepository, LeadStore};
//!
//! let db = Database::connect(&DatabaseConfig::from_env()).await?;
//! let leads = LeadRepository::new(db.pool().clone());
//! let lead = leads.find_by_id(id).await?;
//! ```

pub mod clients;
pub mod filters;
pub mod follow_ups;
pub mod leads;
pub mod memory;
pub mod pool;
pub mod repository;
pub mod users;
pub mod work_time;

// Re-exports
pub use clients::{ClientRepository, ClientRow, ClientStore};
pub use filters::{
    escape_like, ClientListQuery, ClientSortField, DateBounds, FollowUpWindow, LeadListQuery,
    LeadSortField, UserListQuery,
};
pub use follow_ups::{FollowUpRepository, FollowUpRow, FollowUpStore};
pub use leads::{LeadRepository, LeadRow, LeadStore};
pub use memory::{
    MemoryClientStore, MemoryFollowUpStore, MemoryLeadStore, MemoryUserStore,
    MemoryWorkTimeEventStore,
};
pub use pool::{Database, DatabaseConfig, PoolStats};
pub use repository::{Pagination, PaginatedResult, RepositoryError, RepositoryResult};
pub use users::{UserRepository, UserRow, UserStore};
pub use work_time::{WorkTimeEventRepository, WorkTimeEventRow, WorkTimeEventStore};
