//! User repository
//!
//! Table: users (id, email, full_name, role, is_active, module_permissions
//! jsonb, created_at, updated_at, deleted_at)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crm_core::traits::Id;
use crm_models::access::ModulePermissions;
use crm_models::role::Role;
use crm_models::user::UserAccount;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::filters::{escape_like, search_term, UserListQuery};
use crate::repository::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Includes soft-deleted rows
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<UserAccount>>;

    async fn find_by_ids(&self, ids: &[Id]) -> RepositoryResult<Vec<UserAccount>>;

    /// Newest first, soft-deleted rows excluded
    async fn list(&self, query: &UserListQuery) -> RepositoryResult<Vec<UserAccount>>;

    async fn insert(&self, account: &UserAccount) -> RepositoryResult<UserAccount>;

    async fn update(&self, account: &UserAccount) -> RepositoryResult<UserAccount>;
}

/// User database entity
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Id,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub is_active: bool,
    pub module_permissions: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for UserAccount {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            role: Role::parse_optional(row.role.as_deref()),
            is_active: row.is_active,
            module_permissions: row
                .module_permissions
                .as_ref()
                .map(ModulePermissions::from_json)
                .unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

const COLUMNS: &str = "id, email, full_name, role, is_active, module_permissions, \
                       created_at, updated_at, deleted_at";

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserAccount::from))
    }

    async fn find_by_ids(&self, ids: &[Id]) -> RepositoryResult<Vec<UserAccount>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ANY($1)",
            COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserAccount::from).collect())
    }

    async fn list(&self, query: &UserListQuery) -> RepositoryResult<Vec<UserAccount>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM users WHERE deleted_at IS NULL",
            COLUMNS
        ));

        if let Some(term) = search_term(&query.search) {
            let pattern = format!("%{}%", escape_like(term));
            qb.push(" AND (full_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(role) = &query.role {
            qb.push(" AND role = ").push_bind(role.as_str().to_string());
        }
        if let Some(active) = query.is_active {
            qb.push(" AND is_active = ").push_bind(active);
        }
        qb.push(" ORDER BY created_at DESC, id");

        let rows = qb.build_query_as::<UserRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(UserAccount::from).collect())
    }

    async fn insert(&self, account: &UserAccount) -> RepositoryResult<UserAccount> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, full_name, role, is_active, module_permissions,
                               created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.full_name)
        .bind(account.role.as_ref().map(|r| r.as_str().to_string()))
        .bind(account.is_active)
        .bind(account.module_permissions.to_json())
        .bind(account.created_at)
        .bind(account.updated_at)
        .bind(account.deleted_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return RepositoryError::Conflict(format!(
                        "User {} already exists",
                        account.email
                    ));
                }
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    async fn update(&self, account: &UserAccount) -> RepositoryResult<UserAccount> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET full_name = $2, role = $3, is_active = $4, module_permissions = $5,
                updated_at = $6, deleted_at = $7
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(account.id)
        .bind(&account.full_name)
        .bind(account.role.as_ref().map(|r| r.as_str().to_string()))
        .bind(account.is_active)
        .bind(account.module_permissions.to_json())
        .bind(account.updated_at)
        .bind(account.deleted_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("User {}", account.id)))?;

        Ok(row.into())
    }
}
