//! Client form contract

use crm_core::error::ValidationErrors;
use crm_models::client::ClientForm;

use crate::base::{collect_derive_errors, is_blank, is_valid_email, Contract, ValidationResult};
use crate::leads::REQUIRED_FIELDS_MESSAGE;

#[derive(Debug, Default, Clone, Copy)]
pub struct ClientContract;

impl Contract<ClientForm> for ClientContract {
    fn validate(&self, form: &ClientForm) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if is_blank(&form.name) || is_blank(&form.phone) || form.status.is_none() {
            errors.add_base(REQUIRED_FIELDS_MESSAGE);
        }

        if let Some(email) = form.email.as_deref().filter(|e| !e.is_empty()) {
            if !is_valid_email(email) {
                errors.add("email", "is invalid");
            }
        }
        collect_derive_errors(form, &mut errors);

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_models::client::ClientStatus;

    fn form() -> ClientForm {
        ClientForm {
            name: "Meera".to_string(),
            phone: "555-0199".to_string(),
            status: Some(ClientStatus::Active),
            ..Default::default()
        }
    }

    #[test]
    fn test_email_optional_but_checked() {
        assert!(ClientContract.validate(&form()).is_ok());

        let mut f = form();
        f.email = Some(String::new());
        assert!(ClientContract.validate(&f).is_ok());

        f.email = Some("meera@".to_string());
        let errors = ClientContract.validate(&f).unwrap_err();
        assert_eq!(errors.get("email"), Some(&vec!["is invalid".to_string()]));
    }

    #[test]
    fn test_missing_status() {
        let mut f = form();
        f.status = None;
        let errors = ClientContract.validate(&f).unwrap_err();
        assert_eq!(errors.base_errors, vec![REQUIRED_FIELDS_MESSAGE.to_string()]);
    }
}
