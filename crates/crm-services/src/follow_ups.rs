//! Follow-up services for leads and clients
//!
//! Lead follow-ups are gated by `leads`, client follow-ups by `customers`.
//! After any change to a lead's follow-ups the lead's next follow-up date
//! is reset to the date on its most recently created follow-up.

use std::collections::HashMap;
use std::sync::Arc;

use crm_auth::{CurrentUser, RequiredLevel};
use crm_contracts::{Contract, FollowUpContract};
use crm_core::error::CrmError;
use crm_core::result::CrmResult;
use crm_core::traits::Id;
use crm_db::{ClientStore, FollowUpStore, LeadStore, UserStore};
use crm_models::follow_up::{FollowUp, FollowUpForm, FollowUpSubject};
use crm_models::modules::{CLIENTS, LEADS};
use tracing::{info, warn};

use crate::base::{authorize, storage_error};

const UNKNOWN_USER: &str = "Unknown User";

/// Which kind of record a follow-up route addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    Lead,
    Client,
}

impl SubjectKind {
    pub fn of(subject: &FollowUpSubject) -> Self {
        match subject {
            FollowUpSubject::Lead(_) => SubjectKind::Lead,
            FollowUpSubject::Client(_) => SubjectKind::Client,
        }
    }

    pub fn module(&self) -> &'static str {
        match self {
            SubjectKind::Lead => LEADS,
            SubjectKind::Client => CLIENTS,
        }
    }
}

pub struct FollowUpService {
    follow_ups: Arc<dyn FollowUpStore>,
    leads: Arc<dyn LeadStore>,
    clients: Arc<dyn ClientStore>,
    users: Arc<dyn UserStore>,
}

impl FollowUpService {
    pub fn new(
        follow_ups: Arc<dyn FollowUpStore>,
        leads: Arc<dyn LeadStore>,
        clients: Arc<dyn ClientStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            follow_ups,
            leads,
            clients,
            users,
        }
    }

    /// Follow-ups of a lead or client, oldest first, with author names
    pub async fn list(
        &self,
        actor: Option<&CurrentUser>,
        subject: FollowUpSubject,
    ) -> CrmResult<Vec<FollowUp>> {
        authorize(
            actor,
            SubjectKind::of(&subject).module(),
            RequiredLevel::Read,
            "view follow-ups",
            "view follow-ups",
        )?;
        self.ensure_subject(subject).await?;
        self.list_resolved(subject).await
    }

    /// Follow-ups recorded on the lead a client was converted from
    pub async fn list_for_client_lead(
        &self,
        actor: Option<&CurrentUser>,
        client_id: Id,
    ) -> CrmResult<Vec<FollowUp>> {
        authorize(
            actor,
            CLIENTS,
            RequiredLevel::Read,
            "view follow-ups",
            "view follow-ups",
        )?;
        let client = self
            .clients
            .find_by_id(client_id)
            .await
            .map_err(|e| storage_error(e, "Failed to fetch client"))?
            .ok_or_else(|| CrmError::not_found("Client", client_id))?;

        match client.lead_id {
            Some(lead_id) => self.list_resolved(FollowUpSubject::Lead(lead_id)).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn create(
        &self,
        actor: Option<&CurrentUser>,
        subject: FollowUpSubject,
        form: FollowUpForm,
    ) -> CrmResult<FollowUp> {
        let user = authorize(
            actor,
            SubjectKind::of(&subject).module(),
            RequiredLevel::Write,
            "create a follow-up",
            "create follow-ups",
        )?;
        FollowUpContract.validate(&form)?;
        self.ensure_subject(subject).await?;

        let follow_up = FollowUp::new(subject, &form, user.id);
        let mut follow_up = self
            .follow_ups
            .insert(&follow_up)
            .await
            .map_err(|e| storage_error(e, "Failed to create follow-up"))?;
        self.sync_next_date(subject).await?;

        follow_up.created_by_name = Some(
            user.full_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_USER.to_string()),
        );
        info!(
            follow_up_id = %follow_up.id,
            entity_type = subject.entity_type(),
            entity_id = %subject.id(),
            "follow-up created"
        );
        Ok(follow_up)
    }

    pub async fn update(
        &self,
        actor: Option<&CurrentUser>,
        kind: SubjectKind,
        id: Id,
        form: FollowUpForm,
    ) -> CrmResult<FollowUp> {
        authorize(
            actor,
            kind.module(),
            RequiredLevel::Write,
            "update a follow-up",
            "update follow-ups",
        )?;
        FollowUpContract.validate(&form)?;

        let mut follow_up = self.find(kind, id).await?;
        follow_up.apply_form(&form);
        let follow_up = self
            .follow_ups
            .update(&follow_up)
            .await
            .map_err(|e| storage_error(e, "Failed to update follow-up"))?;
        self.sync_next_date(follow_up.subject).await?;

        info!(follow_up_id = %id, "follow-up updated");
        Ok(follow_up)
    }

    pub async fn delete(
        &self,
        actor: Option<&CurrentUser>,
        kind: SubjectKind,
        id: Id,
    ) -> CrmResult<()> {
        authorize(
            actor,
            kind.module(),
            RequiredLevel::Write,
            "delete a follow-up",
            "delete follow-ups",
        )?;
        let follow_up = self.find(kind, id).await?;
        self.follow_ups
            .delete(id)
            .await
            .map_err(|e| storage_error(e, "Failed to delete follow-up"))?;
        self.sync_next_date(follow_up.subject).await?;

        info!(follow_up_id = %id, "follow-up deleted");
        Ok(())
    }

    async fn find(&self, kind: SubjectKind, id: Id) -> CrmResult<FollowUp> {
        self.follow_ups
            .find_by_id(id)
            .await
            .map_err(|e| storage_error(e, "Failed to fetch follow-up"))?
            .filter(|f| SubjectKind::of(&f.subject) == kind)
            .ok_or_else(|| CrmError::not_found("Follow-up", id))
    }

    async fn ensure_subject(&self, subject: FollowUpSubject) -> CrmResult<()> {
        let exists = match subject {
            FollowUpSubject::Lead(id) => self
                .leads
                .find_by_id(id)
                .await
                .map_err(|e| storage_error(e, "Failed to fetch lead"))?
                .is_some(),
            FollowUpSubject::Client(id) => self
                .clients
                .find_by_id(id)
                .await
                .map_err(|e| storage_error(e, "Failed to fetch client"))?
                .is_some(),
        };
        if exists {
            Ok(())
        } else {
            let entity = match subject {
                FollowUpSubject::Lead(_) => "Lead",
                FollowUpSubject::Client(_) => "Client",
            };
            Err(CrmError::not_found(entity, subject.id()))
        }
    }

    async fn list_resolved(&self, subject: FollowUpSubject) -> CrmResult<Vec<FollowUp>> {
        let mut follow_ups = self
            .follow_ups
            .list_for(subject)
            .await
            .map_err(|e| storage_error(e, "Failed to fetch follow-ups"))?;
        if follow_ups.is_empty() {
            return Ok(follow_ups);
        }

        let mut author_ids: Vec<Id> = follow_ups.iter().map(|f| f.created_by).collect();
        author_ids.sort();
        author_ids.dedup();

        let names: HashMap<Id, String> = match self.users.find_by_ids(&author_ids).await {
            Ok(users) => users
                .iter()
                .map(|u| (u.id, u.display_name().to_string()))
                .collect(),
            Err(e) => {
                warn!(error = %e, "could not resolve follow-up authors");
                HashMap::new()
            }
        };

        for follow_up in &mut follow_ups {
            follow_up.created_by_name = Some(
                names
                    .get(&follow_up.created_by)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_USER.to_string()),
            );
        }
        Ok(follow_ups)
    }

    /// Keep a lead's next follow-up date in step with its newest follow-up
    async fn sync_next_date(&self, subject: FollowUpSubject) -> CrmResult<()> {
        let FollowUpSubject::Lead(lead_id) = subject else {
            return Ok(());
        };
        let latest = self
            .follow_ups
            .latest_for(subject)
            .await
            .map_err(|e| storage_error(e, "Failed to fetch follow-ups"))?;
        self.leads
            .set_follow_up_date(lead_id, latest.and_then(|f| f.follow_up_date))
            .await
            .map_err(|e| storage_error(e, "Failed to update lead follow-up date"))
    }
}
