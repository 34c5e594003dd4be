//! Validations shared by the user contracts

use crm_core::error::ValidationErrors;
use crm_models::access::ModulePermissions;
use crm_models::modules;
use crm_models::role::Role;

use crate::base::{is_blank, is_valid_email, UserContext};

pub const ROLE_ASSIGNMENT_MESSAGE: &str =
    "Only administrators can assign the admin or manager role";

pub struct UserBaseContract<'a, U: UserContext> {
    actor: &'a U,
    password_min_length: usize,
}

impl<'a, U: UserContext> UserBaseContract<'a, U> {
    pub fn new(actor: &'a U, password_min_length: usize) -> Self {
        Self {
            actor,
            password_min_length,
        }
    }

    pub fn actor(&self) -> &U {
        self.actor
    }

    pub fn validate_email(&self, email: &str, errors: &mut ValidationErrors) {
        if is_blank(email) {
            errors.add("email", "can't be blank");
        } else if !is_valid_email(email.trim()) {
            errors.add("email", "is invalid");
        }
    }

    pub fn validate_full_name(&self, full_name: Option<&str>, errors: &mut ValidationErrors) {
        if full_name.map_or(true, is_blank) {
            errors.add("full_name", "can't be blank");
        }
    }

    pub fn validate_password(&self, password: &str, errors: &mut ValidationErrors) {
        if password.chars().count() < self.password_min_length {
            errors.add(
                "password",
                format!(
                    "is too short (minimum is {} characters)",
                    self.password_min_length
                ),
            );
        }
    }

    /// Only the four assignable roles may be stored
    pub fn validate_role(&self, role: &Role, errors: &mut ValidationErrors) {
        if !role.is_recognized() {
            errors.add("role", "is not included in the list");
        }
    }

    /// Admin and manager may only be handed out by an admin
    pub fn validate_role_assignment(&self, role: &Role, errors: &mut ValidationErrors) {
        if matches!(role, Role::Admin | Role::Manager) && !self.actor.is_admin() {
            errors.add_base(ROLE_ASSIGNMENT_MESSAGE);
        }
    }

    pub fn validate_module_permissions(
        &self,
        permissions: &ModulePermissions,
        errors: &mut ValidationErrors,
    ) {
        for module in permissions.modules() {
            if !modules::is_known_module(module) {
                errors.add(
                    "module_permissions",
                    format!("contains unknown module '{}'", module),
                );
            }
        }
    }
}
