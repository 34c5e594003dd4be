//! # crm-contracts
//!
//! Contract validation for CRM RS.
//!
//! Contracts check form input before a service writes it. Permission gates
//! live in the services; contracts only add the rules that depend on who
//! is acting (e.g. role assignment).

pub mod base;
pub mod clients;
pub mod follow_ups;
pub mod leads;
pub mod users;

pub use base::*;
pub use clients::ClientContract;
pub use follow_ups::FollowUpContract;
pub use leads::LeadContract;
pub use users::{ChangePasswordContract, CreateUserContract, UpdateUserContract};
