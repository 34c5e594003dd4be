//! Lead form contract

use crm_core::error::ValidationErrors;
use crm_models::lead::LeadForm;

use crate::base::{collect_derive_errors, is_blank, Contract, ValidationResult};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Name, phone, and status are required";

/// Validates lead create/update input
#[derive(Debug, Default, Clone, Copy)]
pub struct LeadContract;

impl Contract<LeadForm> for LeadContract {
    fn validate(&self, form: &LeadForm) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if is_blank(&form.name) || is_blank(&form.phone) || form.status.is_none() {
            errors.add_base(REQUIRED_FIELDS_MESSAGE);
        }
        collect_derive_errors(form, &mut errors);

        errors.into_result()
    }
}
