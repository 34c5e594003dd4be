//! Update contract for users

use crm_core::error::ValidationErrors;
use crm_models::user::{UserAccount, UserAccountUpdate};

use super::base::UserBaseContract;
use crate::base::{collect_derive_errors, Contract, UserContext, ValidationResult};

pub const ROLE_CHANGE_MESSAGE: &str = "Only administrators can change user roles";

/// Validates a partial update against the stored account
pub struct UpdateUserContract<'a, U: UserContext> {
    base: UserBaseContract<'a, U>,
    existing: &'a UserAccount,
}

impl<'a, U: UserContext> UpdateUserContract<'a, U> {
    pub fn new(actor: &'a U, existing: &'a UserAccount, password_min_length: usize) -> Self {
        Self {
            base: UserBaseContract::new(actor, password_min_length),
            existing,
        }
    }

    fn validate_role_change(&self, update: &UserAccountUpdate, errors: &mut ValidationErrors) {
        let Some(role) = &update.role else {
            return;
        };
        if self.existing.role.as_ref() != Some(role) {
            self.base.validate_role(role, errors);
            if !self.base.actor().is_admin() {
                errors.add_base(ROLE_CHANGE_MESSAGE);
            }
        }
    }
}

impl<'a, U: UserContext> Contract<UserAccountUpdate> for UpdateUserContract<'a, U> {
    fn validate(&self, update: &UserAccountUpdate) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if update.full_name.is_some() {
            self.base
                .validate_full_name(update.full_name.as_deref(), &mut errors);
        }
        if let Some(password) = &update.password {
            self.base.validate_password(password, &mut errors);
        }
        if let Some(perms) = &update.module_permissions {
            self.base.validate_module_permissions(perms, &mut errors);
        }
        self.validate_role_change(update, &mut errors);
        collect_derive_errors(update, &mut errors);

        errors.into_result()
    }
}
