//! Follow-up form contract

use crm_core::error::ValidationErrors;
use crm_models::follow_up::FollowUpForm;

use crate::base::{collect_derive_errors, Contract, ValidationResult};

pub const NOTE_OR_DATE_MESSAGE: &str =
    "Please add a note or set a reminder date (at least one is required)";

/// At least one of a non-blank note or a date
#[derive(Debug, Default, Clone, Copy)]
pub struct FollowUpContract;

impl Contract<FollowUpForm> for FollowUpContract {
    fn validate(&self, form: &FollowUpForm) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if form.trimmed_note().is_none() && form.follow_up_date.is_none() {
            errors.add_base(NOTE_OR_DATE_MESSAGE);
        }
        collect_derive_errors(form, &mut errors);

        errors.into_result()
    }
}
