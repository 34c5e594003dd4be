//! Reconstruction output

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Seconds attributed to one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkTimeSummary {
    /// Sum of closed segments
    pub total_seconds: i64,
    /// Start of a segment still open when the replay finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_since: Option<DateTime<Utc>>,
    /// Elapsed seconds of the open segment at the replay's `as_of`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_seconds: Option<i64>,
    /// Ascending by date
    pub day_breakdown: Vec<DayBucket>,
}

impl WorkTimeSummary {
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Elapsed seconds of the open segment at `as_of`
    ///
    /// Never part of `total_seconds`; callers that want a live figure add
    /// it themselves.
    pub fn running_seconds(&self, as_of: DateTime<Utc>) -> Option<i64> {
        self.running_since
            .map(|since| (as_of.timestamp() - since.timestamp()).max(0))
    }

    /// Seconds attributed to `date`, zero when the day was not visited
    pub fn seconds_on(&self, date: NaiveDate) -> i64 {
        self.day_breakdown
            .iter()
            .find(|b| b.date == date)
            .map(|b| b.seconds)
            .unwrap_or(0)
    }
}
