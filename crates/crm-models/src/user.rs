//! User account model
//!
//! Table: users

use chrono::{DateTime, Utc};
use crm_core::traits::{Entity, Id, Identifiable, SoftDeletable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::access::ModulePermissions;
use crate::role::Role;

/// Application profile of an authenticated account
///
/// The credentials live with the identity provider; this row carries the
/// role, grants and activity flag the permission resolver reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Id,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: bool,
    #[serde(default)]
    pub module_permissions: ModulePermissions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl UserAccount {
    pub fn new(id: Id, email: impl Into<String>, role: Option<Role>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: email.into(),
            full_name: None,
            role,
            is_active: true,
            module_permissions: ModulePermissions::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Name shown next to authored records
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Unknown User")
    }

    /// Active and not soft-deleted
    pub fn can_sign_in(&self) -> bool {
        self.is_active && !self.is_deleted()
    }
}

impl Identifiable for UserAccount {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for UserAccount {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl SoftDeletable for UserAccount {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl Entity for UserAccount {
    const TABLE_NAME: &'static str = "users";
    const TYPE_NAME: &'static str = "User";
}

/// Input for creating a user account
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUserAccount {
    #[validate(length(max = 255))]
    pub email: String,
    pub password: String,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub module_permissions: ModulePermissions,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Partial update of a user account
///
/// `module_permissions`, when present, replaces the stored map wholesale.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserAccountUpdate {
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub module_permissions: Option<ModulePermissions>,
    pub password: Option<String>,
}

impl UserAccountUpdate {
    /// Whether any profile column changes (password is handled separately)
    pub fn touches_profile(&self) -> bool {
        self.full_name.is_some()
            || self.role.is_some()
            || self.is_active.is_some()
            || self.module_permissions.is_some()
    }

    pub fn apply_to(&self, account: &mut UserAccount) {
        if let Some(name) = &self.full_name {
            account.full_name = Some(name.clone()).filter(|n| !n.trim().is_empty());
        }
        if let Some(role) = &self.role {
            account.role = Some(role.clone());
        }
        if let Some(active) = self.is_active {
            account.is_active = active;
        }
        if let Some(perms) = &self.module_permissions {
            account.module_permissions = perms.clone();
        }
        account.updated_at = Utc::now();
    }
}
