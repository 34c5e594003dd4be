//! Client model
//!
//! Table: clients

use chrono::{DateTime, Utc};
use crm_core::traits::{Auditable, Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::lead::non_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Inactive,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for ClientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ClientStatus::Active),
            "inactive" => Ok(ClientStatus::Inactive),
            other => Err(format!("unknown client status '{}'", other)),
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A converted customer, optionally linked to the lead it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Id,
    pub name: String,
    pub company_name: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub status: ClientStatus,
    pub remark: Option<String>,
    pub lead_id: Option<Id>,
    pub created_by: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn from_form(form: &ClientForm, status: ClientStatus, created_by: Id) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            name: form.name.clone(),
            company_name: non_blank(&form.company_name),
            phone: form.phone.clone(),
            email: non_blank(&form.email),
            status,
            remark: non_blank(&form.remark),
            lead_id: form.lead_id,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_form(&mut self, form: &ClientForm, status: ClientStatus) {
        self.name = form.name.clone();
        self.company_name = non_blank(&form.company_name);
        self.phone = form.phone.clone();
        self.email = non_blank(&form.email);
        self.status = status;
        self.remark = non_blank(&form.remark);
        self.lead_id = form.lead_id;
        self.updated_at = Utc::now();
    }
}

impl Identifiable for Client {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Client {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Auditable for Client {
    fn created_by(&self) -> Id {
        self.created_by
    }
}

impl Entity for Client {
    const TABLE_NAME: &'static str = "clients";
    const TYPE_NAME: &'static str = "Client";
}

/// Client create/update input
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ClientForm {
    #[serde(default)]
    #[validate(length(max = 255))]
    pub name: String,
    #[validate(length(max = 255))]
    pub company_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub phone: String,
    pub email: Option<String>,
    pub status: Option<ClientStatus>,
    pub remark: Option<String>,
    pub lead_id: Option<Id>,
}
