//! List filters and sort keys
//!
//! Sort fields map onto a fixed set of column names, so they can be pushed
//! into SQL verbatim. Search terms are always bound, never interpolated.

use chrono::{Days, NaiveDate};
use crm_core::pagination::SortDirection;
use crm_models::client::ClientStatus;
use crm_models::lead::LeadStatus;
use crm_models::role::Role;
use serde::{Deserialize, Serialize};

/// Escape ILIKE wildcards so `%`, `_` and `\` match literally
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive literal substring match, the in-memory ILIKE
pub(crate) fn contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle_lower))
}

/// Trimmed, non-empty search term
pub(crate) fn search_term(search: &Option<String>) -> Option<&str> {
    search.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Named follow-up windows relative to "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpWindow {
    #[default]
    All,
    Today,
    ThisWeek,
    ThisMonth,
    Overdue,
    #[serde(rename = "no_followup")]
    NoFollowUp,
}

impl FollowUpWindow {
    /// Date bounds for this window when today is `today`
    pub fn bounds(&self, today: NaiveDate) -> DateBounds {
        let plus = |days: u64| today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
        match self {
            FollowUpWindow::All => DateBounds::Unbounded,
            FollowUpWindow::Today => DateBounds::Between {
                from: today,
                to: today,
            },
            FollowUpWindow::ThisWeek => DateBounds::Between {
                from: today,
                to: plus(7),
            },
            FollowUpWindow::ThisMonth => DateBounds::Between {
                from: today,
                to: plus(30),
            },
            FollowUpWindow::Overdue => DateBounds::Before(today),
            FollowUpWindow::NoFollowUp => DateBounds::Missing,
        }
    }
}

/// Constraint on a nullable date column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateBounds {
    #[default]
    Unbounded,
    /// Inclusive on both ends
    Between { from: NaiveDate, to: NaiveDate },
    /// Strictly before, non-null
    Before(NaiveDate),
    /// Null only
    Missing,
}

impl DateBounds {
    pub fn matches(&self, value: Option<NaiveDate>) -> bool {
        match (self, value) {
            (DateBounds::Unbounded, _) => true,
            (DateBounds::Between { from, to }, Some(d)) => d >= *from && d <= *to,
            (DateBounds::Before(limit), Some(d)) => d < *limit,
            (DateBounds::Missing, None) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSortField {
    Name,
    CompanyName,
    Phone,
    Status,
    FollowUpDate,
    #[default]
    CreatedAt,
}

impl LeadSortField {
    pub fn column(&self) -> &'static str {
        match self {
            LeadSortField::Name => "name",
            LeadSortField::CompanyName => "company_name",
            LeadSortField::Phone => "phone",
            LeadSortField::Status => "status",
            LeadSortField::FollowUpDate => "follow_up_date",
            LeadSortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientSortField {
    Name,
    CompanyName,
    Phone,
    Email,
    Status,
    #[default]
    CreatedAt,
}

impl ClientSortField {
    pub fn column(&self) -> &'static str {
        match self {
            ClientSortField::Name => "name",
            ClientSortField::CompanyName => "company_name",
            ClientSortField::Phone => "phone",
            ClientSortField::Email => "email",
            ClientSortField::Status => "status",
            ClientSortField::CreatedAt => "created_at",
        }
    }
}

/// Resolved lead listing query
#[derive(Debug, Clone, Default)]
pub struct LeadListQuery {
    /// Matched against name and company name
    pub search: Option<String>,
    pub status: Option<LeadStatus>,
    pub follow_up: DateBounds,
    pub sort: LeadSortField,
    pub direction: SortDirection,
}

/// Resolved client listing query
#[derive(Debug, Clone, Default)]
pub struct ClientListQuery {
    /// Matched against name, company name and email
    pub search: Option<String>,
    pub status: Option<ClientStatus>,
    pub sort: ClientSortField,
    pub direction: SortDirection,
}

/// User listing query; soft-deleted rows are always excluded
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    /// Matched against full name and email
    pub search: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}
