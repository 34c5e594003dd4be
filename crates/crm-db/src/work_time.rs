//! Work-time event repository
//!
//! Table: work_time_events (append-only)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crm_core::traits::Id;
use crm_models::work_time::{WorkTimeEvent, WorkTimeEventType};
use sqlx::{FromRow, PgPool};

use crate::repository::RepositoryResult;

#[async_trait]
pub trait WorkTimeEventStore: Send + Sync {
    async fn append(&self, event: &WorkTimeEvent) -> RepositoryResult<()>;

    /// All of a member's events, oldest first
    async fn list_for_user(&self, user_id: Id) -> RepositoryResult<Vec<WorkTimeEvent>>;
}

#[derive(Debug, Clone, FromRow)]
pub struct WorkTimeEventRow {
    pub user_id: Id,
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
}

impl From<WorkTimeEventRow> for WorkTimeEvent {
    fn from(row: WorkTimeEventRow) -> Self {
        WorkTimeEvent::new(
            row.user_id,
            WorkTimeEventType::from(row.event_type),
            row.occurred_at,
        )
    }
}

pub struct WorkTimeEventRepository {
    pool: PgPool,
}

impl WorkTimeEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkTimeEventStore for WorkTimeEventRepository {
    async fn append(&self, event: &WorkTimeEvent) -> RepositoryResult<()> {
        sqlx::query(
            "INSERT INTO work_time_events (user_id, event_type, occurred_at) VALUES ($1, $2, $3)",
        )
        .bind(event.user_id)
        .bind(event.event_type.as_str())
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: Id) -> RepositoryResult<Vec<WorkTimeEvent>> {
        let rows = sqlx::query_as::<_, WorkTimeEventRow>(
            r#"
            SELECT user_id, event_type, occurred_at
            FROM work_time_events
            WHERE user_id = $1
            ORDER BY occurred_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WorkTimeEvent::from).collect())
    }
}
