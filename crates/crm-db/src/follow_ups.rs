//! Follow-up repository
//!
//! Table: follow_ups (entity_type is `lead` or `client`, entity_id points
//! at the subject row)

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use crm_core::traits::Id;
use crm_models::follow_up::{FollowUp, FollowUpSubject};
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait FollowUpStore: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<FollowUp>>;

    /// Oldest first
    async fn list_for(&self, subject: FollowUpSubject) -> RepositoryResult<Vec<FollowUp>>;

    /// Most recently created record for the subject
    async fn latest_for(&self, subject: FollowUpSubject) -> RepositoryResult<Option<FollowUp>>;

    async fn insert(&self, follow_up: &FollowUp) -> RepositoryResult<FollowUp>;

    async fn update(&self, follow_up: &FollowUp) -> RepositoryResult<FollowUp>;

    async fn delete(&self, id: Id) -> RepositoryResult<()>;
}

#[derive(Debug, Clone, FromRow)]
pub struct FollowUpRow {
    pub id: Id,
    pub entity_type: String,
    pub entity_id: Id,
    pub note: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub created_by: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<FollowUpRow> for FollowUp {
    type Error = RepositoryError;

    fn try_from(row: FollowUpRow) -> Result<Self, Self::Error> {
        let subject = match row.entity_type.as_str() {
            "lead" => FollowUpSubject::Lead(row.entity_id),
            "client" => FollowUpSubject::Client(row.entity_id),
            other => {
                return Err(RepositoryError::Decode(format!(
                    "unknown follow-up entity type '{}'",
                    other
                )))
            }
        };
        Ok(Self {
            id: row.id,
            subject,
            note: row.note,
            follow_up_date: row.follow_up_date,
            created_by: row.created_by,
            created_by_name: None,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str =
    "id, entity_type, entity_id, note, follow_up_date, created_by, created_at, updated_at";

pub struct FollowUpRepository {
    pool: PgPool,
}

impl FollowUpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode_all(rows: Vec<FollowUpRow>) -> RepositoryResult<Vec<FollowUp>> {
    rows.into_iter().map(FollowUp::try_from).collect()
}

#[async_trait]
impl FollowUpStore for FollowUpRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<FollowUp>> {
        let row = sqlx::query_as::<_, FollowUpRow>(&format!(
            "SELECT {} FROM follow_ups WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(FollowUp::try_from).transpose()
    }

    async fn list_for(&self, subject: FollowUpSubject) -> RepositoryResult<Vec<FollowUp>> {
        let rows = sqlx::query_as::<_, FollowUpRow>(&format!(
            r#"
            SELECT {} FROM follow_ups
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY created_at ASC, id
            "#,
            COLUMNS
        ))
        .bind(subject.entity_type())
        .bind(subject.id())
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    async fn latest_for(&self, subject: FollowUpSubject) -> RepositoryResult<Option<FollowUp>> {
        let row = sqlx::query_as::<_, FollowUpRow>(&format!(
            r#"
            SELECT {} FROM follow_ups
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            COLUMNS
        ))
        .bind(subject.entity_type())
        .bind(subject.id())
        .fetch_optional(&self.pool)
        .await?;

        row.map(FollowUp::try_from).transpose()
    }

    async fn insert(&self, follow_up: &FollowUp) -> RepositoryResult<FollowUp> {
        let row = sqlx::query_as::<_, FollowUpRow>(&format!(
            r#"
            INSERT INTO follow_ups (id, entity_type, entity_id, note, follow_up_date,
                                    created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(follow_up.id)
        .bind(follow_up.subject.entity_type())
        .bind(follow_up.subject.id())
        .bind(&follow_up.note)
        .bind(follow_up.follow_up_date)
        .bind(follow_up.created_by)
        .bind(follow_up.created_at)
        .bind(follow_up.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(&self, follow_up: &FollowUp) -> RepositoryResult<FollowUp> {
        let row = sqlx::query_as::<_, FollowUpRow>(&format!(
            r#"
            UPDATE follow_ups
            SET note = $2, follow_up_date = $3, updated_at = $4
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(follow_up.id)
        .bind(&follow_up.note)
        .bind(follow_up.follow_up_date)
        .bind(follow_up.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Follow-up {}", follow_up.id)))?;

        row.try_into()
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM follow_ups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Follow-up {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_subject_decode() {
        let now = Utc::now();
        let entity_id = uuid::Uuid::new_v4();
        let mut row = FollowUpRow {
            id: uuid::Uuid::new_v4(),
            entity_type: "client".to_string(),
            entity_id,
            note: Some("Renewal call".to_string()),
            follow_up_date: None,
            created_by: uuid::Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };
        let fu = FollowUp::try_from(row.clone()).unwrap();
        assert_eq!(fu.subject, FollowUpSubject::Client(entity_id));

        row.entity_type = "vendor".to_string();
        assert!(FollowUp::try_from(row).is_err());
    }
}
