//! User administration
//!
//! Module: `users`. Credentials live with the identity provider; profile
//! rows (role, grants, active flag) live in the user store.

use std::sync::Arc;

use chrono::Utc;
use crm_auth::{CurrentUser, IdentityError, IdentityProvider, RequiredLevel};
use crm_contracts::{ChangePasswordContract, Contract, CreateUserContract, UpdateUserContract};
use crm_core::error::CrmError;
use crm_core::result::CrmResult;
use crm_core::traits::{Id, SoftDeletable};
use crm_db::{UserListQuery, UserStore};
use crm_models::modules::USERS;
use crm_models::role::Role;
use crm_models::user::{NewUserAccount, UserAccount, UserAccountUpdate};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::base::{authorize, storage_error, ServiceSettings};

pub const PROFILE_SYNC_FAILED_MESSAGE: &str =
    "Auth account created, but profile sync failed. Please check DB roles.";
pub const SELF_DELETE_MESSAGE: &str = "You cannot delete your own account";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserListParams {
    pub search: Option<String>,
    /// Role tag, or `all`
    pub role: Option<String>,
    /// `active`, `inactive` or `all`
    pub status: Option<String>,
}

impl UserListParams {
    fn into_query(self) -> UserListQuery {
        let role = self
            .role
            .as_deref()
            .filter(|r| *r != "all")
            .and_then(|r| Role::parse_optional(Some(r)));
        let is_active = match self.status.as_deref() {
            Some("active") => Some(true),
            Some("inactive") => Some(false),
            _ => None,
        };
        UserListQuery {
            search: self.search,
            role,
            is_active,
        }
    }
}

pub struct UserService {
    users: Arc<dyn UserStore>,
    identity: Arc<dyn IdentityProvider>,
    settings: ServiceSettings,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        identity: Arc<dyn IdentityProvider>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            users,
            identity,
            settings,
        }
    }

    /// Load the acting user for a request; deleted or inactive accounts
    /// are treated as signed out
    pub async fn current_user(&self, id: Id) -> CrmResult<Option<CurrentUser>> {
        let account = self
            .users
            .find_by_id(id)
            .await
            .map_err(|e| storage_error(e, "Failed to fetch user"))?;
        Ok(account
            .filter(UserAccount::can_sign_in)
            .map(|a| CurrentUser::from(&a)))
    }

    pub async fn list(
        &self,
        actor: Option<&CurrentUser>,
        params: UserListParams,
    ) -> CrmResult<Vec<UserAccount>> {
        authorize(actor, USERS, RequiredLevel::Read, "view users", "view users")?;
        self.users
            .list(&params.into_query())
            .await
            .map_err(|e| storage_error(e, "Failed to fetch users"))
    }

    pub async fn get(&self, actor: Option<&CurrentUser>, id: Id) -> CrmResult<UserAccount> {
        authorize(actor, USERS, RequiredLevel::Read, "view a user", "view this user")?;
        self.find(id).await
    }

    /// Create the identity account, then its profile row
    ///
    /// If the profile write fails the identity account is deleted again.
    pub async fn create(
        &self,
        actor: Option<&CurrentUser>,
        mut input: NewUserAccount,
    ) -> CrmResult<UserAccount> {
        let user = authorize(
            actor,
            USERS,
            RequiredLevel::Write,
            "create a user",
            "create users",
        )?;
        input.email = input.email.trim().to_string();
        CreateUserContract::new(user, self.settings.password_min_length).validate(&input)?;

        let id = self
            .identity
            .create_account(&input.email, &input.password)
            .await
            .map_err(identity_error)?;

        let mut account = UserAccount::new(id, input.email.clone(), Some(input.role.clone()));
        account.full_name = input.full_name.clone().filter(|n| !n.trim().is_empty());
        account.is_active = input.is_active;
        account.module_permissions = input.module_permissions.clone();

        match self.users.insert(&account).await {
            Ok(account) => {
                info!(
                    user_id = %account.id,
                    role = ?account.role,
                    actor_id = %user.id,
                    "user created"
                );
                Ok(account)
            }
            Err(e) => {
                error!(error = %e, user_id = %id, "profile sync failed");
                if let Err(cleanup) = self.identity.delete_account(id).await {
                    warn!(
                        error = %cleanup,
                        user_id = %id,
                        "could not remove orphaned identity account"
                    );
                }
                Err(CrmError::storage(PROFILE_SYNC_FAILED_MESSAGE))
            }
        }
    }

    /// Apply a partial update; permission grants are replaced wholesale
    pub async fn update(
        &self,
        actor: Option<&CurrentUser>,
        id: Id,
        update: UserAccountUpdate,
    ) -> CrmResult<UserAccount> {
        let user = authorize(
            actor,
            USERS,
            RequiredLevel::Write,
            "update a user",
            "update users",
        )?;
        let mut account = self.find(id).await?;
        UpdateUserContract::new(user, &account, self.settings.password_min_length)
            .validate(&update)?;

        if update.touches_profile() {
            update.apply_to(&mut account);
            account = self
                .users
                .update(&account)
                .await
                .map_err(|e| storage_error(e, "Failed to update user"))?;
        }

        if let Some(password) = update.password.as_deref().filter(|p| !p.is_empty()) {
            self.identity
                .update_password(id, password)
                .await
                .map_err(|e| {
                    error!(error = %e, user_id = %id, "password update failed");
                    CrmError::Identity("Failed to update password".to_string())
                })?;
        }

        info!(user_id = %id, actor_id = %user.id, "user updated");
        Ok(account)
    }

    /// Soft delete: stamp `deleted_at` and deactivate
    pub async fn delete(&self, actor: Option<&CurrentUser>, id: Id) -> CrmResult<()> {
        let user = authorize(
            actor,
            USERS,
            RequiredLevel::Write,
            "delete a user",
            "delete users",
        )?;
        if user.id == id {
            return Err(CrmError::invalid(SELF_DELETE_MESSAGE));
        }

        let mut account = self.find(id).await?;
        let now = Utc::now();
        account.deleted_at = Some(now);
        account.is_active = false;
        account.updated_at = now;
        self.users
            .update(&account)
            .await
            .map_err(|e| storage_error(e, "Failed to delete user"))?;

        info!(user_id = %id, actor_id = %user.id, "user deleted");
        Ok(())
    }

    pub async fn change_password(
        &self,
        actor: Option<&CurrentUser>,
        id: Id,
        password: &str,
    ) -> CrmResult<()> {
        authorize(
            actor,
            USERS,
            RequiredLevel::Write,
            "change a password",
            "change passwords",
        )?;
        ChangePasswordContract::new(self.settings.password_min_length).validate(password)?;
        self.find(id).await?;

        self.identity
            .update_password(id, password)
            .await
            .map_err(identity_error)?;
        info!(user_id = %id, "password changed");
        Ok(())
    }

    /// Non-deleted account by id
    async fn find(&self, id: Id) -> CrmResult<UserAccount> {
        self.users
            .find_by_id(id)
            .await
            .map_err(|e| storage_error(e, "Failed to fetch user"))?
            .filter(|a| !a.is_deleted())
            .ok_or_else(|| CrmError::not_found("User", id))
    }
}

fn identity_error(err: IdentityError) -> CrmError {
    match err {
        IdentityError::DuplicateEmail(_) => CrmError::conflict(err.to_string()),
        IdentityError::NotFound => CrmError::not_found("Account", "identity"),
        other => {
            error!(error = %other, "identity provider call failed");
            CrmError::Identity(other.to_string())
        }
    }
}
