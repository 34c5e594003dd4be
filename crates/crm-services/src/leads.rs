//! Lead services
//!
//! Module: `leads`

use std::sync::Arc;

use crm_auth::{CurrentUser, RequiredLevel};
use crm_contracts::leads::REQUIRED_FIELDS_MESSAGE;
use crm_contracts::{Contract, LeadContract};
use crm_core::error::CrmError;
use crm_core::pagination::{Page, SortDirection};
use crm_core::result::CrmResult;
use crm_core::traits::Id;
use crm_db::{FollowUpWindow, LeadListQuery, LeadSortField, LeadStore, Pagination};
use crm_models::lead::{Lead, LeadForm, LeadStatus};
use crm_models::modules::LEADS;
use serde::Deserialize;
use tracing::info;

use crate::base::{authorize, parse_filter, storage_error, ServiceSettings};

/// Lead listing parameters as they arrive from a client
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LeadListParams {
    pub search: Option<String>,
    /// Lead status, or `all`
    pub status: Option<String>,
    pub follow_up: FollowUpWindow,
    pub sort: LeadSortField,
    pub direction: SortDirection,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

pub struct LeadService {
    leads: Arc<dyn LeadStore>,
    settings: ServiceSettings,
}

impl LeadService {
    pub fn new(leads: Arc<dyn LeadStore>, settings: ServiceSettings) -> Self {
        Self { leads, settings }
    }

    pub async fn create(&self, actor: Option<&CurrentUser>, form: LeadForm) -> CrmResult<Lead> {
        let user = authorize(
            actor,
            LEADS,
            RequiredLevel::Write,
            "create a lead",
            "create a lead",
        )?;
        LeadContract.validate(&form)?;
        let status = required_status(&form)?;

        let lead = Lead::from_form(&form, status, user.id);
        let lead = self
            .leads
            .insert(&lead)
            .await
            .map_err(|e| storage_error(e, "Failed to create lead"))?;

        info!(lead_id = %lead.id, user_id = %user.id, "lead created");
        Ok(lead)
    }

    pub async fn update(
        &self,
        actor: Option<&CurrentUser>,
        id: Id,
        form: LeadForm,
    ) -> CrmResult<Lead> {
        let user = authorize(
            actor,
            LEADS,
            RequiredLevel::Write,
            "update a lead",
            "update this lead",
        )?;
        let mut lead = self.find(id).await?;
        LeadContract.validate(&form)?;
        let status = required_status(&form)?;

        lead.apply_form(&form, status);
        let lead = self
            .leads
            .update(&lead)
            .await
            .map_err(|e| storage_error(e, "Failed to update lead"))?;

        info!(lead_id = %lead.id, user_id = %user.id, "lead updated");
        Ok(lead)
    }

    pub async fn get(&self, actor: Option<&CurrentUser>, id: Id) -> CrmResult<Lead> {
        authorize(
            actor,
            LEADS,
            RequiredLevel::Read,
            "view a lead",
            "view this lead",
        )?;
        self.find(id).await
    }

    /// One page of leads plus the total matching count
    pub async fn list_page(
        &self,
        actor: Option<&CurrentUser>,
        params: LeadListParams,
    ) -> CrmResult<Page<Lead>> {
        authorize(actor, LEADS, RequiredLevel::Read, "view leads", "view leads")?;

        let query = LeadListQuery {
            search: params.search,
            status: parse_filter::<LeadStatus>(&params.status, "status")?,
            follow_up: params.follow_up.bounds(self.settings.today()),
            sort: params.sort,
            direction: params.direction,
        };
        let request = self.settings.page_request(params.page, params.page_size);

        let result = self
            .leads
            .list(&query, Pagination::from(request))
            .await
            .map_err(|e| storage_error(e, "Failed to fetch leads"))?;

        Ok(Page::new(result.items, result.total, request))
    }

    pub async fn delete(&self, actor: Option<&CurrentUser>, id: Id) -> CrmResult<()> {
        let user = authorize(
            actor,
            LEADS,
            RequiredLevel::Write,
            "delete a lead",
            "delete this lead",
        )?;
        self.find(id).await?;
        self.leads
            .delete(id)
            .await
            .map_err(|e| storage_error(e, "Failed to delete lead"))?;

        info!(lead_id = %id, user_id = %user.id, "lead deleted");
        Ok(())
    }

    async fn find(&self, id: Id) -> CrmResult<Lead> {
        self.leads
            .find_by_id(id)
            .await
            .map_err(|e| storage_error(e, "Failed to fetch lead"))?
            .ok_or_else(|| CrmError::not_found("Lead", id))
    }
}

fn required_status(form: &LeadForm) -> CrmResult<LeadStatus> {
    form.status
        .ok_or_else(|| CrmError::invalid(REQUIRED_FIELDS_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crm_db::MemoryLeadStore;
    use crm_models::access::{AccessLevel, ModulePermissions};
    use crm_models::role::Role;
    use uuid::Uuid;

    fn service() -> LeadService {
        LeadService::new(Arc::new(MemoryLeadStore::new()), ServiceSettings::default())
    }

    fn staff(level: AccessLevel) -> CurrentUser {
        CurrentUser::new(Uuid::new_v4(), "staff@example.com", Some(Role::Staff))
            .with_permissions(ModulePermissions::new().with(LEADS, level))
    }

    fn form(name: &str) -> LeadForm {
        LeadForm {
            name: name.to_string(),
            phone: "555-0101".to_string(),
            status: Some(LeadStatus::New),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_requires_login() {
        let err = service().create(None, form("Ravi")).await.unwrap_err();
        assert_eq!(err.to_string(), "You must be logged in to create a lead");
    }

    #[tokio::test]
    async fn test_read_only_staff_cannot_create() {
        let user = staff(AccessLevel::Read);
        let err = service().create(Some(&user), form("Ravi")).await.unwrap_err();
        assert_eq!(err.to_string(), "You do not have permission to create a lead");
    }

    #[tokio::test]
    async fn test_create_validates_required_fields() {
        let user = staff(AccessLevel::Write);
        let mut input = form("Ravi");
        input.phone = "   ".to_string();

        let err = service().create(Some(&user), input).await.unwrap_err();
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.to_string(), REQUIRED_FIELDS_MESSAGE);
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let service = service();
        let user = staff(AccessLevel::Write);

        let lead = service.create(Some(&user), form("Ravi")).await.unwrap();
        assert_eq!(lead.created_by, user.id);

        let mut input = form("Ravi Kumar");
        input.status = Some(LeadStatus::Contacted);
        let updated = service.update(Some(&user), lead.id, input).await.unwrap();
        assert_eq!(updated.name, "Ravi Kumar");
        assert_eq!(updated.status, LeadStatus::Contacted);

        let fetched = service.get(Some(&user), lead.id).await.unwrap();
        assert_eq!(fetched.name, "Ravi Kumar");

        service.delete(Some(&user), lead.id).await.unwrap();
        let err = service.get(Some(&user), lead.id).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_list_page_filters_and_counts() {
        let service = service();
        let user = staff(AccessLevel::Write);
        for name in ["Asha", "Bala", "Chitra"] {
            service.create(Some(&user), form(name)).await.unwrap();
        }
        let mut contacted = form("Dev");
        contacted.status = Some(LeadStatus::Contacted);
        service.create(Some(&user), contacted).await.unwrap();

        let params = LeadListParams {
            status: Some("new".to_string()),
            sort: LeadSortField::Name,
            direction: SortDirection::Asc,
            page: Some(1),
            page_size: Some(2),
            ..Default::default()
        };
        let page = service.list_page(Some(&user), params).await.unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].name, "Asha");

        let params = LeadListParams {
            status: Some("all".to_string()),
            ..Default::default()
        };
        let page = service.list_page(Some(&user), params).await.unwrap();
        assert_eq!(page.total_count, 4);
    }

    #[tokio::test]
    async fn test_list_page_overdue_window() {
        let service = service();
        let user = staff(AccessLevel::Write);
        let today = ServiceSettings::default().today();

        let mut overdue = form("Late");
        overdue.follow_up_date = Some(today - Duration::days(2));
        service.create(Some(&user), overdue).await.unwrap();
        let mut upcoming = form("Soon");
        upcoming.follow_up_date = Some(today + Duration::days(2));
        service.create(Some(&user), upcoming).await.unwrap();

        let params = LeadListParams {
            follow_up: FollowUpWindow::Overdue,
            ..Default::default()
        };
        let page = service.list_page(Some(&user), params).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.data[0].name, "Late");

        let params = LeadListParams {
            follow_up: FollowUpWindow::ThisWeek,
            ..Default::default()
        };
        let page = service.list_page(Some(&user), params).await.unwrap();
        assert_eq!(page.data[0].name, "Soon");
    }

    #[tokio::test]
    async fn test_manager_has_full_access() {
        let service = service();
        let manager = CurrentUser::new(Uuid::new_v4(), "m@example.com", Some(Role::Manager));
        assert!(service.create(Some(&manager), form("Ravi")).await.is_ok());
    }
}
