//! Client repository
//!
//! Table: clients

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crm_core::traits::Id;
use crm_models::client::{Client, ClientStatus};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::filters::{escape_like, search_term, ClientListQuery};
use crate::repository::{Pagination, PaginatedResult, RepositoryError, RepositoryResult};

#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Client>>;

    async fn list(
        &self,
        query: &ClientListQuery,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<Client>>;

    async fn insert(&self, client: &Client) -> RepositoryResult<Client>;

    async fn update(&self, client: &Client) -> RepositoryResult<Client>;

    async fn delete(&self, id: Id) -> RepositoryResult<()>;
}

#[derive(Debug, Clone, FromRow)]
pub struct ClientRow {
    pub id: Id,
    pub name: String,
    pub company_name: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub status: String,
    pub remark: Option<String>,
    pub lead_id: Option<Id>,
    pub created_by: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ClientRow> for Client {
    type Error = RepositoryError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        let status: ClientStatus = row.status.parse().map_err(RepositoryError::Decode)?;
        Ok(Self {
            id: row.id,
            name: row.name,
            company_name: row.company_name,
            phone: row.phone,
            email: row.email,
            status,
            remark: row.remark,
            lead_id: row.lead_id,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, name, company_name, phone, email, status, remark, lead_id, \
                       created_by, created_at, updated_at";

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ClientListQuery) {
    qb.push(" WHERE TRUE");

    if let Some(term) = search_term(&query.search) {
        let pattern = format!("%{}%", escape_like(term));
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR company_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
}

pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStore for ClientRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {} FROM clients WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Client::try_from).transpose()
    }

    async fn list(
        &self,
        query: &ClientListQuery,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<Client>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM clients", COLUMNS));
        push_filters(&mut qb, query);
        qb.push(" ORDER BY ")
            .push(query.sort.column())
            .push(" ")
            .push(query.direction.as_sql())
            .push(", id LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset);
        let rows = qb.build_query_as::<ClientRow>().fetch_all(&self.pool).await?;

        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM clients");
        push_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let items = rows
            .into_iter()
            .map(Client::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(items, total, pagination))
    }

    async fn insert(&self, client: &Client) -> RepositoryResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            INSERT INTO clients (id, name, company_name, phone, email, status, remark, lead_id,
                                 created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.company_name)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(client.status.as_str())
        .bind(&client.remark)
        .bind(client.lead_id)
        .bind(client.created_by)
        .bind(client.created_at)
        .bind(client.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(&self, client: &Client) -> RepositoryResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            UPDATE clients
            SET name = $2, company_name = $3, phone = $4, email = $5, status = $6,
                remark = $7, lead_id = $8, updated_at = $9
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.company_name)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(client.status.as_str())
        .bind(&client.remark)
        .bind(client.lead_id)
        .bind(client.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Client {}", client.id)))?;

        row.try_into()
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Client {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_covers_email() {
        let query = ClientListQuery {
            search: Some("acme".to_string()),
            ..Default::default()
        };
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM clients");
        push_filters(&mut qb, &query);
        assert!(qb.sql().contains("OR email ILIKE $3"));
    }
}
