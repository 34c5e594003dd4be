//! # crm-auth
//!
//! Authorization for CRM RS.
//!
//! ## Features
//!
//! - Permission resolver: role + per-module grants to an access level
//! - Current-user context built from an account row
//! - Identity provider seam used by user administration

pub mod identity;
pub mod permissions;

pub use identity::{IdentityError, IdentityProvider, MemoryIdentityProvider};
pub use permissions::{
    can_read, can_write, has_permission, resolve_access_level, CurrentUser, PermissionContext,
    RequiredLevel,
};
