//! Work-time events
//!
//! Table: work_time_events

use chrono::{DateTime, Utc};
use crm_core::traits::Id;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of work-time transition
///
/// Unknown tags are preserved so the log can be stored verbatim; the
/// reconstructor ignores them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkTimeEventType {
    Start,
    Resume,
    Hold,
    End,
    Unknown(String),
}

impl WorkTimeEventType {
    pub fn as_str(&self) -> &str {
        match self {
            WorkTimeEventType::Start => "start",
            WorkTimeEventType::Resume => "resume",
            WorkTimeEventType::Hold => "hold",
            WorkTimeEventType::End => "end",
            WorkTimeEventType::Unknown(tag) => tag,
        }
    }

    /// Start or resume
    pub fn opens_segment(&self) -> bool {
        matches!(self, WorkTimeEventType::Start | WorkTimeEventType::Resume)
    }

    /// Hold or end
    pub fn closes_segment(&self) -> bool {
        matches!(self, WorkTimeEventType::Hold | WorkTimeEventType::End)
    }
}

impl From<&str> for WorkTimeEventType {
    fn from(raw: &str) -> Self {
        match raw {
            "start" => WorkTimeEventType::Start,
            "resume" => WorkTimeEventType::Resume,
            "hold" => WorkTimeEventType::Hold,
            "end" => WorkTimeEventType::End,
            other => WorkTimeEventType::Unknown(other.to_string()),
        }
    }
}

impl From<String> for WorkTimeEventType {
    fn from(raw: String) -> Self {
        WorkTimeEventType::from(raw.as_str())
    }
}

impl From<WorkTimeEventType> for String {
    fn from(kind: WorkTimeEventType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for WorkTimeEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamped transition in a member's work log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkTimeEvent {
    pub user_id: Id,
    pub event_type: WorkTimeEventType,
    pub occurred_at: DateTime<Utc>,
}

impl WorkTimeEvent {
    pub fn new(user_id: Id, event_type: WorkTimeEventType, occurred_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            event_type,
            occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_parse() {
        assert_eq!(WorkTimeEventType::from("hold"), WorkTimeEventType::Hold);
        assert!(WorkTimeEventType::from("resume").opens_segment());
        assert!(WorkTimeEventType::from("end").closes_segment());

        let odd = WorkTimeEventType::from("pause");
        assert_eq!(odd, WorkTimeEventType::Unknown("pause".to_string()));
        assert!(!odd.opens_segment() && !odd.closes_segment());
        assert_eq!(String::from(odd), "pause");
    }
}
