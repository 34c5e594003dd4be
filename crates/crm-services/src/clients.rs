//! Client services
//!
//! Module: `customers`

use std::sync::Arc;

use crm_auth::{CurrentUser, RequiredLevel};
use crm_contracts::leads::REQUIRED_FIELDS_MESSAGE;
use crm_contracts::{ClientContract, Contract};
use crm_core::error::CrmError;
use crm_core::pagination::{Page, SortDirection};
use crm_core::result::CrmResult;
use crm_core::traits::Id;
use crm_db::{ClientListQuery, ClientSortField, ClientStore, Pagination};
use crm_models::client::{Client, ClientForm, ClientStatus};
use crm_models::modules::CLIENTS;
use serde::Deserialize;
use tracing::info;

use crate::base::{authorize, parse_filter, storage_error, ServiceSettings};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientListParams {
    pub search: Option<String>,
    /// `active`, `inactive` or `all`
    pub status: Option<String>,
    pub sort: ClientSortField,
    pub direction: SortDirection,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

pub struct ClientService {
    clients: Arc<dyn ClientStore>,
    settings: ServiceSettings,
}

impl ClientService {
    pub fn new(clients: Arc<dyn ClientStore>, settings: ServiceSettings) -> Self {
        Self { clients, settings }
    }

    pub async fn create(
        &self,
        actor: Option<&CurrentUser>,
        form: ClientForm,
    ) -> CrmResult<Client> {
        let user = authorize(
            actor,
            CLIENTS,
            RequiredLevel::Write,
            "create a client",
            "create a client",
        )?;
        ClientContract.validate(&form)?;
        let status = required_status(&form)?;

        let client = Client::from_form(&form, status, user.id);
        let client = self
            .clients
            .insert(&client)
            .await
            .map_err(|e| storage_error(e, "Failed to create client"))?;

        info!(
            client_id = %client.id,
            lead_id = ?client.lead_id,
            user_id = %user.id,
            "client created"
        );
        Ok(client)
    }

    pub async fn update(
        &self,
        actor: Option<&CurrentUser>,
        id: Id,
        form: ClientForm,
    ) -> CrmResult<Client> {
        let user = authorize(
            actor,
            CLIENTS,
            RequiredLevel::Write,
            "update a client",
            "update this client",
        )?;
        let mut client = self.find(id).await?;
        ClientContract.validate(&form)?;
        let status = required_status(&form)?;

        client.apply_form(&form, status);
        let client = self
            .clients
            .update(&client)
            .await
            .map_err(|e| storage_error(e, "Failed to update client"))?;

        info!(client_id = %client.id, user_id = %user.id, "client updated");
        Ok(client)
    }

    pub async fn get(&self, actor: Option<&CurrentUser>, id: Id) -> CrmResult<Client> {
        authorize(
            actor,
            CLIENTS,
            RequiredLevel::Read,
            "view a client",
            "view this client",
        )?;
        self.find(id).await
    }

    pub async fn list_page(
        &self,
        actor: Option<&CurrentUser>,
        params: ClientListParams,
    ) -> CrmResult<Page<Client>> {
        authorize(
            actor,
            CLIENTS,
            RequiredLevel::Read,
            "view clients",
            "view clients",
        )?;

        let query = ClientListQuery {
            search: params.search,
            status: parse_filter::<ClientStatus>(&params.status, "status")?,
            sort: params.sort,
            direction: params.direction,
        };
        let request = self.settings.page_request(params.page, params.page_size);

        let result = self
            .clients
            .list(&query, Pagination::from(request))
            .await
            .map_err(|e| storage_error(e, "Failed to fetch clients"))?;

        Ok(Page::new(result.items, result.total, request))
    }

    pub async fn delete(&self, actor: Option<&CurrentUser>, id: Id) -> CrmResult<()> {
        let user = authorize(
            actor,
            CLIENTS,
            RequiredLevel::Write,
            "delete a client",
            "delete this client",
        )?;
        self.find(id).await?;
        self.clients
            .delete(id)
            .await
            .map_err(|e| storage_error(e, "Failed to delete client"))?;

        info!(client_id = %id, user_id = %user.id, "client deleted");
        Ok(())
    }

    async fn find(&self, id: Id) -> CrmResult<Client> {
        self.clients
            .find_by_id(id)
            .await
            .map_err(|e| storage_error(e, "Failed to fetch client"))?
            .ok_or_else(|| CrmError::not_found("Client", id))
    }
}

fn required_status(form: &ClientForm) -> CrmResult<ClientStatus> {
    form.status
        .ok_or_else(|| CrmError::invalid(REQUIRED_FIELDS_MESSAGE))
}
