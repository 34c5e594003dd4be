//! Core error types for CRM RS

use std::collections::BTreeMap;
use thiserror::Error;

/// Core error type for all CRM operations
#[derive(Error, Debug)]
pub enum CrmError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{message}")]
    Unauthenticated { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{}", .0.full_messages().join(", "))]
    Validation(#[from] ValidationErrors),

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    Storage { message: String },

    #[error("Identity provider error: {0}")]
    Identity(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CrmError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CrmError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        CrmError::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        CrmError::Forbidden {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CrmError::Conflict {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        CrmError::Storage {
            message: message.into(),
        }
    }

    /// Single base validation message
    pub fn invalid(message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add_base(message);
        CrmError::Validation(errors)
    }

    pub fn status_code(&self) -> u16 {
        match self {
            CrmError::NotFound { .. } => 404,
            CrmError::Unauthenticated { .. } => 401,
            CrmError::Forbidden { .. } => 403,
            CrmError::Validation(_) => 422,
            CrmError::Conflict { .. } => 409,
            CrmError::Storage { .. } | CrmError::Internal(_) => 500,
            CrmError::Identity(_) => 502,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CrmError::NotFound { .. } => "not_found",
            CrmError::Unauthenticated { .. } => "unauthenticated",
            CrmError::Forbidden { .. } => "forbidden",
            CrmError::Validation(_) => "validation_failed",
            CrmError::Conflict { .. } => "conflict",
            CrmError::Storage { .. } => "storage_error",
            CrmError::Identity(_) => "identity_provider_error",
            CrmError::Internal(_) => "internal_error",
        }
    }
}

/// Validation errors collection
///
/// Field-keyed messages are kept in a sorted map so that `full_messages`
/// is stable across runs.
#[derive(Error, Debug, Default, Clone, PartialEq, Eq)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: BTreeMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Get errors for a specific field
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// `Ok(())` when empty, otherwise the collected errors
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_collect() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("phone", "can't be blank");
        errors.add_base("Name, phone, and status are required");

        assert!(errors.has_error("phone"));
        assert!(!errors.has_error("name"));
        assert_eq!(
            errors.full_messages(),
            vec![
                "Name, phone, and status are required".to_string(),
                "phone can't be blank".to_string()
            ]
        );
    }

    #[test]
    fn test_merge() {
        let mut a = ValidationErrors::new();
        a.add("email", "is invalid");
        let mut b = ValidationErrors::new();
        b.add("email", "is taken");
        b.add_base("base");

        a.merge(b);
        assert_eq!(a.get("email").map(Vec::len), Some(2));
        assert_eq!(a.base_errors, vec!["base".to_string()]);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CrmError::not_found("Lead", "x").status_code(), 404);
        assert_eq!(CrmError::unauthenticated("no").status_code(), 401);
        assert_eq!(CrmError::forbidden("no").status_code(), 403);
        assert_eq!(CrmError::invalid("bad").status_code(), 422);
        assert_eq!(CrmError::storage("down").error_code(), "storage_error");
    }

    #[test]
    fn test_validation_display_uses_messages() {
        let err = CrmError::invalid("Name, phone, and status are required");
        assert_eq!(err.to_string(), "Name, phone, and status are required");
    }
}
