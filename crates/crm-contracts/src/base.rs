//! Base contract system

use crm_auth::CurrentUser;
use crm_core::error::ValidationErrors;
use crm_core::traits::Id;
use regex::Regex;
use std::sync::LazyLock;

pub use crm_core::result::ValidationResult;

/// Valid email pattern
pub(crate) static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// Acting user as seen by contracts
pub trait UserContext: Send + Sync {
    fn id(&self) -> Id;
    fn is_admin(&self) -> bool;
    fn can_read(&self, module: &str) -> bool;
    fn can_write(&self, module: &str) -> bool;
}

impl UserContext for CurrentUser {
    fn id(&self) -> Id {
        self.id
    }

    fn is_admin(&self) -> bool {
        CurrentUser::is_admin(self)
    }

    fn can_read(&self, module: &str) -> bool {
        CurrentUser::can_read(self, module)
    }

    fn can_write(&self, module: &str) -> bool {
        CurrentUser::can_write(self, module)
    }
}

/// Base contract trait
pub trait Contract<T: ?Sized>: Send + Sync {
    fn validate(&self, entity: &T) -> ValidationResult;
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Fold `validator` derive failures into field errors
pub fn collect_derive_errors<T: validator::Validate>(entity: &T, errors: &mut ValidationErrors) {
    if let Err(derived) = entity.validate() {
        for (field, field_errors) in derived.field_errors() {
            for error in field_errors {
                let message = match error.code.as_ref() {
                    "length" => match error.params.get("max") {
                        Some(max) => format!("is too long (maximum is {} characters)", max),
                        None => "has an invalid length".to_string(),
                    },
                    _ => "is invalid".to_string(),
                };
                errors.add(field.to_string(), message);
            }
        }
    }
}

/// Blank after trimming (or missing)
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("asha@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.in"));
        assert!(!is_valid_email("asha@example"));
        assert!(!is_valid_email("not an email"));
    }
}
