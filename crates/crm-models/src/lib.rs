//! # crm-models
//!
//! Domain models for CRM RS.
//!
//! Roles, access levels and the module registry used by the permission
//! resolver, plus the entity structs stored by the repositories.

pub use crm_core::traits::{Auditable, Entity, Id, Identifiable, SoftDeletable, Timestamped};

pub mod access;
pub mod client;
pub mod follow_up;
pub mod lead;
pub mod modules;
pub mod role;
pub mod user;
pub mod work_time;

pub use access::{AccessLevel, ModulePermissions};
pub use client::{Client, ClientForm, ClientStatus};
pub use follow_up::{FollowUp, FollowUpForm, FollowUpSubject};
pub use lead::{Lead, LeadForm, LeadStatus};
pub use role::Role;
pub use user::{NewUserAccount, UserAccount, UserAccountUpdate};
pub use work_time::{WorkTimeEvent, WorkTimeEventType};
