//! Shared service plumbing
//!
//! Every operation resolves the acting user first, then checks module
//! access, and only then touches storage.

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use crm_auth::{has_permission, CurrentUser, RequiredLevel};
use crm_core::config::AppConfig;
use crm_core::error::{CrmError, ValidationErrors};
use crm_core::pagination::{PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crm_core::result::CrmResult;
use crm_db::RepositoryError;
use std::str::FromStr;

/// Settings the services need from the application configuration
#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    /// Zone that defines "today" and work-time day buckets
    pub day_boundary: FixedOffset,
    pub password_min_length: usize,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            day_boundary: Utc.fix(),
            password_min_length: 6,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl From<&AppConfig> for ServiceSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            day_boundary: config.work_time.day_boundary(),
            password_min_length: config.auth.password_min_length,
            default_page_size: config.pagination.default_page_size,
            max_page_size: config.pagination.max_page_size,
        }
    }
}

impl ServiceSettings {
    /// Calendar date of "now" in the day-boundary zone
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.day_boundary).date_naive()
    }

    /// Build a page request, clamping to the configured maximum
    pub fn page_request(&self, page: Option<i64>, page_size: Option<i64>) -> PageRequest {
        PageRequest {
            page: page.unwrap_or(1),
            page_size: page_size.unwrap_or(self.default_page_size),
        }
        .normalized_with_max(self.max_page_size)
    }
}

/// Resolve the acting user; absent and inactive users are not logged in
pub fn require_actor<'a>(
    actor: Option<&'a CurrentUser>,
    action: &str,
) -> CrmResult<&'a CurrentUser> {
    match actor {
        Some(user) if user.is_active => Ok(user),
        _ => Err(CrmError::unauthenticated(format!(
            "You must be logged in to {}",
            action
        ))),
    }
}

/// Resolve the actor and check its access to `module`
///
/// `action` completes "You must be logged in to ..." and `denied` completes
/// "You do not have permission to ...".
pub fn authorize<'a>(
    actor: Option<&'a CurrentUser>,
    module: &str,
    level: RequiredLevel,
    action: &str,
    denied: &str,
) -> CrmResult<&'a CurrentUser> {
    let user = require_actor(actor, action)?;
    if !has_permission(Some(user), module, level) {
        tracing::debug!(user_id = %user.id, module, ?level, "permission denied");
        return Err(CrmError::forbidden(format!(
            "You do not have permission to {}",
            denied
        )));
    }
    Ok(user)
}

/// Parse an optional list filter; blank and `all` mean no filter
pub fn parse_filter<T: FromStr>(value: &Option<String>, field: &str) -> CrmResult<Option<T>> {
    match value.as_deref().map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            let mut errors = ValidationErrors::new();
            errors.add(field, "is not included in the list");
            CrmError::Validation(errors)
        }),
    }
}

/// Log a storage failure and turn it into a user-facing error
pub(crate) fn storage_error(err: RepositoryError, failure: &str) -> CrmError {
    match err {
        RepositoryError::Conflict(message) => CrmError::conflict(message),
        other => {
            tracing::error!(error = %other, "{}", failure);
            CrmError::storage(failure)
        }
    }
}
