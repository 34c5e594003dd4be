//! Permission resolver
//!
//! Resolution order for a module:
//! 1. no role: `none`
//! 2. `admin`: `write` everywhere
//! 3. `manager`: `none` for `users` and `settings`, `write` for every other
//!    id (unknown ids included)
//! 4. anything else: the stored grant, `none` when missing
//!
//! Resolution is total; unknown roles and malformed grants degrade to the
//! least privileged answer.

use crm_core::traits::Id;
use crm_models::access::{AccessLevel, ModulePermissions};
use crm_models::modules;
use crm_models::role::Role;
use crm_models::user::UserAccount;
use serde::Serialize;

// ============================================================================
// Resolution
// ============================================================================

/// Inputs to a resolution: the user's role and stored grants
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionContext<'a> {
    pub role: Option<&'a Role>,
    pub module_permissions: Option<&'a ModulePermissions>,
}

impl<'a> PermissionContext<'a> {
    pub fn new(role: Option<&'a Role>, module_permissions: Option<&'a ModulePermissions>) -> Self {
        Self {
            role,
            module_permissions,
        }
    }
}

/// Effective access level of `context` for `module_id`
pub fn resolve_access_level(context: &PermissionContext<'_>, module_id: &str) -> AccessLevel {
    let Some(role) = context.role else {
        return AccessLevel::None;
    };

    match role {
        Role::Admin => AccessLevel::Write,
        Role::Manager if modules::MANAGER_DENIED.contains(&module_id) => AccessLevel::None,
        Role::Manager => AccessLevel::Write,
        Role::Staff | Role::Client | Role::Unrecognized(_) => context
            .module_permissions
            .map(|perms| perms.level(module_id))
            .unwrap_or_default(),
    }
}

/// `read` or `write`
pub fn can_read(context: &PermissionContext<'_>, module_id: &str) -> bool {
    resolve_access_level(context, module_id).allows_read()
}

/// `write` only
pub fn can_write(context: &PermissionContext<'_>, module_id: &str) -> bool {
    resolve_access_level(context, module_id).allows_write()
}

// ============================================================================
// User Context
// ============================================================================

/// Required level for a permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredLevel {
    Read,
    Write,
}

/// The signed-in user on whose behalf an operation runs
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Id,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: bool,
    pub module_permissions: ModulePermissions,
}

impl CurrentUser {
    pub fn new(id: Id, email: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            id,
            email: email.into(),
            full_name: None,
            role,
            is_active: true,
            module_permissions: ModulePermissions::new(),
        }
    }

    pub fn with_permissions(mut self, module_permissions: ModulePermissions) -> Self {
        self.module_permissions = module_permissions;
        self
    }

    pub fn permission_context(&self) -> PermissionContext<'_> {
        PermissionContext::new(self.role.as_ref(), Some(&self.module_permissions))
    }

    pub fn access_level(&self, module_id: &str) -> AccessLevel {
        resolve_access_level(&self.permission_context(), module_id)
    }

    pub fn can_read(&self, module_id: &str) -> bool {
        can_read(&self.permission_context(), module_id)
    }

    pub fn can_write(&self, module_id: &str) -> bool {
        can_write(&self.permission_context(), module_id)
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_ref().is_some_and(Role::is_admin)
    }
}

impl From<&UserAccount> for CurrentUser {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            full_name: account.full_name.clone(),
            role: account.role.clone(),
            is_active: account.is_active,
            module_permissions: account.module_permissions.clone(),
        }
    }
}

/// Check a possibly absent user against a module; no user means no access
pub fn has_permission(user: Option<&CurrentUser>, module_id: &str, level: RequiredLevel) -> bool {
    match user {
        None => false,
        Some(user) => match level {
            RequiredLevel::Read => user.can_read(module_id),
            RequiredLevel::Write => user.can_write(module_id),
        },
    }
}
