//! Password change contract

use crm_core::error::ValidationErrors;

use crate::base::{Contract, ValidationResult};

#[derive(Debug, Clone, Copy)]
pub struct ChangePasswordContract {
    pub min_length: usize,
}

impl ChangePasswordContract {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Contract<str> for ChangePasswordContract {
    fn validate(&self, password: &str) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        if password.chars().count() < self.min_length {
            errors.add(
                "password",
                format!("is too short (minimum is {} characters)", self.min_length),
            );
        }
        errors.into_result()
    }
}
