//! Follow-up records for leads and clients
//!
//! A follow-up records a contact that already happened. Its date is the
//! *next* follow-up decided during that contact.

use chrono::{DateTime, NaiveDate, Utc};
use crm_core::traits::{Auditable, Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// What a follow-up is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum FollowUpSubject {
    Lead(Id),
    Client(Id),
}

impl FollowUpSubject {
    pub fn id(&self) -> Id {
        match self {
            FollowUpSubject::Lead(id) | FollowUpSubject::Client(id) => *id,
        }
    }

    pub fn entity_type(&self) -> &'static str {
        match self {
            FollowUpSubject::Lead(_) => "lead",
            FollowUpSubject::Client(_) => "client",
        }
    }

    pub fn is_lead(&self) -> bool {
        matches!(self, FollowUpSubject::Lead(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUp {
    pub id: Id,
    pub subject: FollowUpSubject,
    pub note: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub created_by: Id,
    /// Resolved author name; filled in when listing
    #[serde(default)]
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FollowUp {
    pub fn new(subject: FollowUpSubject, form: &FollowUpForm, created_by: Id) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            subject,
            note: form.trimmed_note(),
            follow_up_date: form.follow_up_date,
            created_by,
            created_by_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_form(&mut self, form: &FollowUpForm) {
        self.note = form.trimmed_note();
        self.follow_up_date = form.follow_up_date;
        self.updated_at = Utc::now();
    }
}

impl Identifiable for FollowUp {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for FollowUp {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Auditable for FollowUp {
    fn created_by(&self) -> Id {
        self.created_by
    }
}

impl Entity for FollowUp {
    const TABLE_NAME: &'static str = "follow_ups";
    const TYPE_NAME: &'static str = "Follow-up";
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct FollowUpForm {
    #[validate(length(max = 5000))]
    pub note: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
}

impl FollowUpForm {
    /// Trimmed note, `None` when blank
    pub fn trimmed_note(&self) -> Option<String> {
        self.note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_note_is_trimmed() {
        let form = FollowUpForm {
            note: Some("  called back  ".to_string()),
            follow_up_date: None,
        };
        let fu = FollowUp::new(FollowUpSubject::Lead(Uuid::new_v4()), &form, Uuid::new_v4());
        assert_eq!(fu.note.as_deref(), Some("called back"));

        let blank = FollowUpForm {
            note: Some("   ".to_string()),
            follow_up_date: None,
        };
        assert_eq!(blank.trimmed_note(), None);
    }

    #[test]
    fn test_subject_serialization() {
        let id = Uuid::nil();
        let json = serde_json::to_value(FollowUpSubject::Client(id)).unwrap();
        assert_eq!(json["type"], "client");
        assert_eq!(FollowUpSubject::Client(id).entity_type(), "client");
    }
}
