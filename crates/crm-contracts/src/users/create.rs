//! Create contract for users

use crm_core::error::ValidationErrors;
use crm_models::user::NewUserAccount;

use super::base::UserBaseContract;
use crate::base::{collect_derive_errors, Contract, UserContext, ValidationResult};

pub struct CreateUserContract<'a, U: UserContext> {
    base: UserBaseContract<'a, U>,
}

impl<'a, U: UserContext> CreateUserContract<'a, U> {
    pub fn new(actor: &'a U, password_min_length: usize) -> Self {
        Self {
            base: UserBaseContract::new(actor, password_min_length),
        }
    }
}

impl<'a, U: UserContext> Contract<NewUserAccount> for CreateUserContract<'a, U> {
    fn validate(&self, input: &NewUserAccount) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        self.base.validate_email(&input.email, &mut errors);
        self.base
            .validate_full_name(input.full_name.as_deref(), &mut errors);
        self.base.validate_password(&input.password, &mut errors);
        self.base.validate_role(&input.role, &mut errors);
        self.base.validate_role_assignment(&input.role, &mut errors);
        self.base
            .validate_module_permissions(&input.module_permissions, &mut errors);
        collect_derive_errors(input, &mut errors);

        errors.into_result()
    }
}
