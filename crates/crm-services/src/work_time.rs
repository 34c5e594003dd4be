//! Work-time tracking
//!
//! Module: `projects`

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crm_auth::{CurrentUser, RequiredLevel};
use crm_core::error::{CrmError, ValidationErrors};
use crm_core::result::CrmResult;
use crm_core::traits::Id;
use crm_db::WorkTimeEventStore;
use crm_models::modules::PROJECTS;
use crm_models::work_time::{WorkTimeEvent, WorkTimeEventType};
use crm_work_time::{compute_member_work_seconds_in, WorkTimeSummary};
use tracing::{debug, info};

use crate::base::{authorize, storage_error, ServiceSettings};

pub struct WorkTimeService {
    events: Arc<dyn WorkTimeEventStore>,
    settings: ServiceSettings,
}

impl WorkTimeService {
    pub fn new(events: Arc<dyn WorkTimeEventStore>, settings: ServiceSettings) -> Self {
        Self { events, settings }
    }

    /// Append an event to the acting user's own log
    pub async fn record(
        &self,
        actor: Option<&CurrentUser>,
        event_type: WorkTimeEventType,
        occurred_at: Option<DateTime<Utc>>,
    ) -> CrmResult<WorkTimeEvent> {
        let user = authorize(
            actor,
            PROJECTS,
            RequiredLevel::Write,
            "record work time",
            "record work time",
        )?;
        if let WorkTimeEventType::Unknown(_) = event_type {
            let mut errors = ValidationErrors::new();
            errors.add("event_type", "is not included in the list");
            return Err(CrmError::Validation(errors));
        }

        let occurred_at = occurred_at.unwrap_or_else(Utc::now);
        let event = WorkTimeEvent::new(user.id, event_type, occurred_at);
        self.events
            .append(&event)
            .await
            .map_err(|e| storage_error(e, "Failed to record work time"))?;

        info!(
            user_id = %user.id,
            event_type = event.event_type.as_str(),
            "work-time event recorded"
        );
        Ok(event)
    }

    /// Worked time for `user_id`, days bucketed in the configured
    /// day-boundary zone; `as_of` (default now) bounds an open segment
    pub async fn summary(
        &self,
        actor: Option<&CurrentUser>,
        user_id: Id,
        as_of: Option<DateTime<Utc>>,
    ) -> CrmResult<WorkTimeSummary> {
        authorize(
            actor,
            PROJECTS,
            RequiredLevel::Read,
            "view work time",
            "view work time",
        )?;
        let events = self
            .events
            .list_for_user(user_id)
            .await
            .map_err(|e| storage_error(e, "Failed to fetch work time"))?;

        let summary =
            compute_member_work_seconds_in(user_id, &events, as_of, &self.settings.day_boundary);
        debug!(
            user_id = %user_id,
            events = events.len(),
            total_seconds = summary.total_seconds,
            "work time reconstructed"
        );
        Ok(summary)
    }
}
