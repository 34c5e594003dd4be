//! In-memory stores
//!
//! Same filtering, ordering and paging as the PostgreSQL repositories.
//! Nullable sort columns order the way PostgreSQL does by default: nulls
//! last ascending, first descending.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use crm_core::pagination::SortDirection;
use crm_core::traits::Id;
use crm_models::client::Client;
use crm_models::follow_up::{FollowUp, FollowUpSubject};
use crm_models::lead::Lead;
use crm_models::user::UserAccount;
use crm_models::work_time::WorkTimeEvent;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::clients::ClientStore;
use crate::filters::{
    contains_ci, search_term, ClientListQuery, ClientSortField, LeadListQuery, LeadSortField,
    UserListQuery,
};
use crate::follow_ups::FollowUpStore;
use crate::leads::LeadStore;
use crate::repository::{Pagination, PaginatedResult, RepositoryError, RepositoryResult};
use crate::users::UserStore;
use crate::work_time::WorkTimeEventStore;

fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    if direction.is_ascending() {
        ordering
    } else {
        ordering.reverse()
    }
}

fn paginate<T>(items: Vec<T>, pagination: Pagination) -> PaginatedResult<T> {
    let total = items.len() as i64;
    let page = items
        .into_iter()
        .skip(pagination.offset.max(0) as usize)
        .take(pagination.limit.max(0) as usize)
        .collect();
    PaginatedResult::new(page, total, pagination)
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Id, UserAccount>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: impl IntoIterator<Item = UserAccount>) -> Self {
        Self {
            users: RwLock::new(accounts.into_iter().map(|a| (a.id, a)).collect()),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<UserAccount>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Id]) -> RepositoryResult<Vec<UserAccount>> {
        let users = self.users.read();
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn list(&self, query: &UserListQuery) -> RepositoryResult<Vec<UserAccount>> {
        let needle = search_term(&query.search).map(str::to_lowercase);
        let mut rows: Vec<UserAccount> = self
            .users
            .read()
            .values()
            .filter(|u| u.deleted_at.is_none())
            .filter(|u| {
                needle.as_deref().map_or(true, |n| {
                    contains_ci(u.full_name.as_deref(), n)
                        || contains_ci(Some(u.email.as_str()), n)
                })
            })
            .filter(|u| query.role.as_ref().map_or(true, |r| u.role.as_ref() == Some(r)))
            .filter(|u| query.is_active.map_or(true, |a| u.is_active == a))
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn insert(&self, account: &UserAccount) -> RepositoryResult<UserAccount> {
        let mut users = self.users.write();
        if users.contains_key(&account.id)
            || users
                .values()
                .any(|u| u.email.eq_ignore_ascii_case(&account.email))
        {
            return Err(RepositoryError::Conflict(format!(
                "User {} already exists",
                account.email
            )));
        }
        users.insert(account.id, account.clone());
        Ok(account.clone())
    }

    async fn update(&self, account: &UserAccount) -> RepositoryResult<UserAccount> {
        let mut users = self.users.write();
        let stored = users
            .get_mut(&account.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("User {}", account.id)))?;
        *stored = account.clone();
        Ok(account.clone())
    }
}

// ============================================================================
// Leads
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryLeadStore {
    leads: RwLock<HashMap<Id, Lead>>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare_leads(a: &Lead, b: &Lead, field: LeadSortField) -> Ordering {
    match field {
        LeadSortField::Name => a.name.cmp(&b.name),
        LeadSortField::CompanyName => nulls_last(a.company_name.as_ref(), b.company_name.as_ref()),
        LeadSortField::Phone => a.phone.cmp(&b.phone),
        LeadSortField::Status => a.status.as_str().cmp(b.status.as_str()),
        LeadSortField::FollowUpDate => nulls_last(a.follow_up_date, b.follow_up_date),
        LeadSortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Lead>> {
        Ok(self.leads.read().get(&id).cloned())
    }

    async fn list(
        &self,
        query: &LeadListQuery,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<Lead>> {
        let needle = search_term(&query.search).map(str::to_lowercase);
        let mut rows: Vec<Lead> = self
            .leads
            .read()
            .values()
            .filter(|l| {
                needle.as_deref().map_or(true, |n| {
                    contains_ci(Some(l.name.as_str()), n)
                        || contains_ci(l.company_name.as_deref(), n)
                })
            })
            .filter(|l| query.status.map_or(true, |s| l.status == s))
            .filter(|l| query.follow_up.matches(l.follow_up_date))
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            directed(compare_leads(a, b, query.sort), query.direction).then(a.id.cmp(&b.id))
        });
        Ok(paginate(rows, pagination))
    }

    async fn insert(&self, lead: &Lead) -> RepositoryResult<Lead> {
        self.leads.write().insert(lead.id, lead.clone());
        Ok(lead.clone())
    }

    async fn update(&self, lead: &Lead) -> RepositoryResult<Lead> {
        let mut leads = self.leads.write();
        let stored = leads
            .get_mut(&lead.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Lead {}", lead.id)))?;
        *stored = lead.clone();
        Ok(lead.clone())
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        self.leads
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("Lead {}", id)))
    }

    async fn set_follow_up_date(&self, id: Id, date: Option<NaiveDate>) -> RepositoryResult<()> {
        if let Some(lead) = self.leads.write().get_mut(&id) {
            lead.follow_up_date = date;
            lead.updated_at = Utc::now();
        }
        Ok(())
    }
}

// ============================================================================
// Clients
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryClientStore {
    clients: RwLock<HashMap<Id, Client>>,
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare_clients(a: &Client, b: &Client, field: ClientSortField) -> Ordering {
    match field {
        ClientSortField::Name => a.name.cmp(&b.name),
        ClientSortField::CompanyName => {
            nulls_last(a.company_name.as_ref(), b.company_name.as_ref())
        }
        ClientSortField::Phone => a.phone.cmp(&b.phone),
        ClientSortField::Email => nulls_last(a.email.as_ref(), b.email.as_ref()),
        ClientSortField::Status => a.status.as_str().cmp(b.status.as_str()),
        ClientSortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Client>> {
        Ok(self.clients.read().get(&id).cloned())
    }

    async fn list(
        &self,
        query: &ClientListQuery,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<Client>> {
        let needle = search_term(&query.search).map(str::to_lowercase);
        let mut rows: Vec<Client> = self
            .clients
            .read()
            .values()
            .filter(|c| {
                needle.as_deref().map_or(true, |n| {
                    contains_ci(Some(c.name.as_str()), n)
                        || contains_ci(c.company_name.as_deref(), n)
                        || contains_ci(c.email.as_deref(), n)
                })
            })
            .filter(|c| query.status.map_or(true, |s| c.status == s))
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            directed(compare_clients(a, b, query.sort), query.direction).then(a.id.cmp(&b.id))
        });
        Ok(paginate(rows, pagination))
    }

    async fn insert(&self, client: &Client) -> RepositoryResult<Client> {
        self.clients.write().insert(client.id, client.clone());
        Ok(client.clone())
    }

    async fn update(&self, client: &Client) -> RepositoryResult<Client> {
        let mut clients = self.clients.write();
        let stored = clients
            .get_mut(&client.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Client {}", client.id)))?;
        *stored = client.clone();
        Ok(client.clone())
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        self.clients
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("Client {}", id)))
    }
}

// ============================================================================
// Follow-ups
// ============================================================================

/// Kept in insertion order so same-instant records stay stable
#[derive(Debug, Default)]
pub struct MemoryFollowUpStore {
    follow_ups: RwLock<Vec<FollowUp>>,
}

impl MemoryFollowUpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FollowUpStore for MemoryFollowUpStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<FollowUp>> {
        Ok(self.follow_ups.read().iter().find(|f| f.id == id).cloned())
    }

    async fn list_for(&self, subject: FollowUpSubject) -> RepositoryResult<Vec<FollowUp>> {
        let mut rows: Vec<FollowUp> = self
            .follow_ups
            .read()
            .iter()
            .filter(|f| f.subject == subject)
            .cloned()
            .collect();
        rows.sort_by_key(|f| f.created_at);
        Ok(rows)
    }

    async fn latest_for(&self, subject: FollowUpSubject) -> RepositoryResult<Option<FollowUp>> {
        Ok(self
            .follow_ups
            .read()
            .iter()
            .filter(|f| f.subject == subject)
            .max_by_key(|f| f.created_at)
            .cloned())
    }

    async fn insert(&self, follow_up: &FollowUp) -> RepositoryResult<FollowUp> {
        let mut stored = follow_up.clone();
        stored.created_by_name = None;
        self.follow_ups.write().push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, follow_up: &FollowUp) -> RepositoryResult<FollowUp> {
        let mut follow_ups = self.follow_ups.write();
        let stored = follow_ups
            .iter_mut()
            .find(|f| f.id == follow_up.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Follow-up {}", follow_up.id)))?;
        stored.note = follow_up.note.clone();
        stored.follow_up_date = follow_up.follow_up_date;
        stored.updated_at = follow_up.updated_at;
        Ok(stored.clone())
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let mut follow_ups = self.follow_ups.write();
        let before = follow_ups.len();
        follow_ups.retain(|f| f.id != id);
        if follow_ups.len() == before {
            return Err(RepositoryError::NotFound(format!("Follow-up {}", id)));
        }
        Ok(())
    }
}

// ============================================================================
// Work-time events
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryWorkTimeEventStore {
    events: RwLock<Vec<WorkTimeEvent>>,
}

impl MemoryWorkTimeEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkTimeEventStore for MemoryWorkTimeEventStore {
    async fn append(&self, event: &WorkTimeEvent) -> RepositoryResult<()> {
        self.events.write().push(event.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: Id) -> RepositoryResult<Vec<WorkTimeEvent>> {
        let mut rows: Vec<WorkTimeEvent> = self
            .events
            .read()
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.occurred_at);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{DateBounds, FollowUpWindow};
    use chrono::Duration;
    use crm_models::lead::{LeadForm, LeadStatus};
    use crm_models::role::Role;
    use uuid::Uuid;

    fn lead(name: &str, company: Option<&str>, follow_up: Option<NaiveDate>) -> Lead {
        let form = LeadForm {
            name: name.to_string(),
            company_name: company.map(str::to_string),
            phone: "555".to_string(),
            status: Some(LeadStatus::New),
            follow_up_date: follow_up,
            ..Default::default()
        };
        Lead::from_form(&form, LeadStatus::New, Uuid::new_v4())
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[tokio::test]
    async fn test_lead_search_is_literal_and_case_insensitive() {
        let store = MemoryLeadStore::new();
        store.insert(&lead("Alpha", Some("ACME 100%"), None)).await.unwrap();
        store.insert(&lead("Beta", Some("Acme1000"), None)).await.unwrap();
        store.insert(&lead("Gamma", None, None)).await.unwrap();

        let query = LeadListQuery {
            search: Some("acme".to_string()),
            ..Default::default()
        };
        let page = store.list(&query, Pagination::default()).await.unwrap();
        assert_eq!(page.total, 2);

        let query = LeadListQuery {
            search: Some("100%".to_string()),
            ..Default::default()
        };
        let page = store.list(&query, Pagination::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Alpha");
    }

    #[tokio::test]
    async fn test_lead_sort_nulls_and_paging() {
        let store = MemoryLeadStore::new();
        store.insert(&lead("A", None, Some(d(3)))).await.unwrap();
        store.insert(&lead("B", None, None)).await.unwrap();
        store.insert(&lead("C", None, Some(d(1)))).await.unwrap();

        let asc = LeadListQuery {
            sort: LeadSortField::FollowUpDate,
            direction: SortDirection::Asc,
            ..Default::default()
        };
        let page = store.list(&asc, Pagination::default()).await.unwrap();
        let names: Vec<&str> = page.items.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);

        let desc = LeadListQuery {
            sort: LeadSortField::FollowUpDate,
            direction: SortDirection::Desc,
            ..Default::default()
        };
        let page = store.list(&desc, Pagination::new(2, 0)).await.unwrap();
        let names: Vec<&str> = page.items.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(page.total, 3);
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn test_lead_follow_up_window() {
        let store = MemoryLeadStore::new();
        store.insert(&lead("Past", None, Some(d(1)))).await.unwrap();
        store.insert(&lead("Today", None, Some(d(10)))).await.unwrap();
        store.insert(&lead("None", None, None)).await.unwrap();

        let query = LeadListQuery {
            follow_up: FollowUpWindow::Overdue.bounds(d(10)),
            ..Default::default()
        };
        let page = store.list(&query, Pagination::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Past");

        let query = LeadListQuery {
            follow_up: DateBounds::Missing,
            ..Default::default()
        };
        let page = store.list(&query, Pagination::default()).await.unwrap();
        assert_eq!(page.items[0].name, "None");
    }

    #[tokio::test]
    async fn test_follow_up_ordering() {
        let store = MemoryFollowUpStore::new();
        let subject = FollowUpSubject::Lead(Uuid::new_v4());
        let author = Uuid::new_v4();
        let base = Utc::now();

        let mut first = FollowUp::new(subject, &Default::default(), author);
        first.created_at = base;
        first.follow_up_date = Some(d(20));
        let mut second = FollowUp::new(subject, &Default::default(), author);
        second.created_at = base + Duration::seconds(5);
        second.follow_up_date = None;

        store.insert(&second).await.unwrap();
        store.insert(&first).await.unwrap();
        store
            .insert(&FollowUp::new(
                FollowUpSubject::Client(Uuid::new_v4()),
                &Default::default(),
                author,
            ))
            .await
            .unwrap();

        let listed = store.list_for(subject).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);

        let latest = store.latest_for(subject).await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);

        store.delete(second.id).await.unwrap();
        let latest = store.latest_for(subject).await.unwrap().unwrap();
        assert_eq!(latest.follow_up_date, Some(d(20)));
    }

    #[tokio::test]
    async fn test_user_list_excludes_deleted() {
        let mut gone = UserAccount::new(Uuid::new_v4(), "gone@example.com", Some(Role::Staff));
        gone.deleted_at = Some(Utc::now());
        let mut inactive =
            UserAccount::new(Uuid::new_v4(), "idle@example.com", Some(Role::Client));
        inactive.is_active = false;
        let active = UserAccount::new(Uuid::new_v4(), "asha@example.com", Some(Role::Staff));

        let store = MemoryUserStore::with_accounts(vec![gone, inactive, active]);
        assert_eq!(store.list(&UserListQuery::default()).await.unwrap().len(), 2);

        let query = UserListQuery {
            role: Some(Role::Staff),
            ..Default::default()
        };
        assert_eq!(store.list(&query).await.unwrap().len(), 1);

        let query = UserListQuery {
            is_active: Some(false),
            ..Default::default()
        };
        let rows = store.list(&query).await.unwrap();
        assert_eq!(rows[0].email, "idle@example.com");

        let dup = UserAccount::new(Uuid::new_v4(), "ASHA@example.com", None);
        assert!(matches!(
            store.insert(&dup).await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_work_time_list_for_user() {
        let store = MemoryWorkTimeEventStore::new();
        let user = Uuid::new_v4();
        let now = Utc::now();
        store
            .append(&WorkTimeEvent::new(Uuid::new_v4(), "start".into(), now))
            .await
            .unwrap();
        for (kind, offset) in [("resume", 120), ("start", 0), ("hold", 60)] {
            store
                .append(&WorkTimeEvent::new(
                    user,
                    kind.into(),
                    now + Duration::seconds(offset),
                ))
                .await
                .unwrap();
        }
        let all = store.list_for_user(user).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|e| e.user_id == user));
        assert!(all.windows(2).all(|w| w[0].occurred_at <= w[1].occurred_at));
    }
}
