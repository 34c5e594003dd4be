//! Lead model
//!
//! Table: leads

use chrono::{DateTime, NaiveDate, Utc};
use crm_core::traits::{Auditable, Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    FollowUp,
    Converted,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::FollowUp => "follow_up",
            LeadStatus::Converted => "converted",
            LeadStatus::Lost => "lost",
        }
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "follow_up" => Ok(LeadStatus::FollowUp),
            "converted" => Ok(LeadStatus::Converted),
            "lost" => Ok(LeadStatus::Lost),
            other => Err(format!("unknown lead status '{}'", other)),
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prospective customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Id,
    pub name: String,
    pub company_name: Option<String>,
    pub phone: String,
    pub source: Option<String>,
    pub status: LeadStatus,
    /// Next scheduled follow-up; kept in step with the newest follow-up record
    pub follow_up_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_by: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Build a new lead from an already validated form
    pub fn from_form(form: &LeadForm, status: LeadStatus, created_by: Id) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            name: form.name.clone(),
            company_name: non_blank(&form.company_name),
            phone: form.phone.clone(),
            source: non_blank(&form.source),
            status,
            follow_up_date: form.follow_up_date,
            notes: non_blank(&form.notes),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_form(&mut self, form: &LeadForm, status: LeadStatus) {
        self.name = form.name.clone();
        self.company_name = non_blank(&form.company_name);
        self.phone = form.phone.clone();
        self.source = non_blank(&form.source);
        self.status = status;
        self.follow_up_date = form.follow_up_date;
        self.notes = non_blank(&form.notes);
        self.updated_at = Utc::now();
    }
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

impl Identifiable for Lead {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Lead {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Auditable for Lead {
    fn created_by(&self) -> Id {
        self.created_by
    }
}

impl Entity for Lead {
    const TABLE_NAME: &'static str = "leads";
    const TYPE_NAME: &'static str = "Lead";
}

/// Lead create/update input
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LeadForm {
    #[serde(default)]
    #[validate(length(max = 255))]
    pub name: String,
    #[validate(length(max = 255))]
    pub company_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub phone: String,
    pub source: Option<String>,
    pub status: Option<LeadStatus>,
    pub follow_up_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_strings() {
        assert_eq!("follow_up".parse::<LeadStatus>(), Ok(LeadStatus::FollowUp));
        assert!("archived".parse::<LeadStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&LeadStatus::FollowUp).unwrap(),
            "\"follow_up\""
        );
    }

    #[test]
    fn test_blank_optionals_become_null() {
        let form = LeadForm {
            name: "Ravi".to_string(),
            company_name: Some(String::new()),
            phone: "555-0101".to_string(),
            source: Some("referral".to_string()),
            status: Some(LeadStatus::New),
            ..Default::default()
        };
        let lead = Lead::from_form(&form, LeadStatus::New, Uuid::new_v4());
        assert_eq!(lead.company_name, None);
        assert_eq!(lead.source.as_deref(), Some("referral"));
        assert_eq!(lead.follow_up_date, None);
    }
}
