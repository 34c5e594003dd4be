//! # crm-core
//!
//! Shared foundation for the CRM RS crates: the `CrmError` taxonomy and
//! its HTTP mapping, `CrmResult`, entity traits keyed by [`Id`], page
//! requests and application configuration.

pub mod config;
pub mod error;
pub mod pagination;
pub mod result;
pub mod traits;

pub use error::*;
pub use pagination::*;
pub use result::*;
pub use traits::*;
