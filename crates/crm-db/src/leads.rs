//! Lead repository
//!
//! Table: leads

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use crm_core::traits::Id;
use crm_models::lead::{Lead, LeadStatus};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::filters::{escape_like, search_term, DateBounds, LeadListQuery};
use crate::repository::{Pagination, PaginatedResult, RepositoryError, RepositoryResult};

#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Lead>>;

    async fn list(
        &self,
        query: &LeadListQuery,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<Lead>>;

    async fn insert(&self, lead: &Lead) -> RepositoryResult<Lead>;

    async fn update(&self, lead: &Lead) -> RepositoryResult<Lead>;

    async fn delete(&self, id: Id) -> RepositoryResult<()>;

    /// Overwrite only the next follow-up date
    async fn set_follow_up_date(&self, id: Id, date: Option<NaiveDate>) -> RepositoryResult<()>;
}

#[derive(Debug, Clone, FromRow)]
pub struct LeadRow {
    pub id: Id,
    pub name: String,
    pub company_name: Option<String>,
    pub phone: String,
    pub source: Option<String>,
    pub status: String,
    pub follow_up_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_by: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<LeadRow> for Lead {
    type Error = RepositoryError;

    fn try_from(row: LeadRow) -> Result<Self, Self::Error> {
        let status: LeadStatus = row.status.parse().map_err(RepositoryError::Decode)?;
        Ok(Self {
            id: row.id,
            name: row.name,
            company_name: row.company_name,
            phone: row.phone,
            source: row.source,
            status,
            follow_up_date: row.follow_up_date,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, name, company_name, phone, source, status, follow_up_date, notes, \
                       created_by, created_at, updated_at";

/// Append the WHERE clause shared by the page and count queries
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &LeadListQuery) {
    qb.push(" WHERE TRUE");

    if let Some(term) = search_term(&query.search) {
        let pattern = format!("%{}%", escape_like(term));
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR company_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    match query.follow_up {
        DateBounds::Unbounded => {}
        DateBounds::Between { from, to } => {
            qb.push(" AND follow_up_date >= ")
                .push_bind(from)
                .push(" AND follow_up_date <= ")
                .push_bind(to);
        }
        DateBounds::Before(limit) => {
            qb.push(" AND follow_up_date IS NOT NULL AND follow_up_date < ")
                .push_bind(limit);
        }
        DateBounds::Missing => {
            qb.push(" AND follow_up_date IS NULL");
        }
    }
}

pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for LeadRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Lead>> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {} FROM leads WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Lead::try_from).transpose()
    }

    async fn list(
        &self,
        query: &LeadListQuery,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<Lead>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM leads", COLUMNS));
        push_filters(&mut qb, query);
        qb.push(" ORDER BY ")
            .push(query.sort.column())
            .push(" ")
            .push(query.direction.as_sql())
            .push(", id LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset);
        let rows = qb.build_query_as::<LeadRow>().fetch_all(&self.pool).await?;

        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM leads");
        push_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let items = rows
            .into_iter()
            .map(Lead::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(items, total, pagination))
    }

    async fn insert(&self, lead: &Lead) -> RepositoryResult<Lead> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            r#"
            INSERT INTO leads (id, name, company_name, phone, source, status, follow_up_date,
                               notes, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(lead.id)
        .bind(&lead.name)
        .bind(&lead.company_name)
        .bind(&lead.phone)
        .bind(&lead.source)
        .bind(lead.status.as_str())
        .bind(lead.follow_up_date)
        .bind(&lead.notes)
        .bind(lead.created_by)
        .bind(lead.created_at)
        .bind(lead.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(&self, lead: &Lead) -> RepositoryResult<Lead> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            r#"
            UPDATE leads
            SET name = $2, company_name = $3, phone = $4, source = $5, status = $6,
                follow_up_date = $7, notes = $8, updated_at = $9
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(lead.id)
        .bind(&lead.name)
        .bind(&lead.company_name)
        .bind(&lead.phone)
        .bind(&lead.source)
        .bind(lead.status.as_str())
        .bind(lead.follow_up_date)
        .bind(&lead.notes)
        .bind(lead.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Lead {}", lead.id)))?;

        row.try_into()
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Lead {}", id)));
        }
        Ok(())
    }

    async fn set_follow_up_date(&self, id: Id, date: Option<NaiveDate>) -> RepositoryResult<()> {
        sqlx::query("UPDATE leads SET follow_up_date = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(date)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
