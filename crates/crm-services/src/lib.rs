//! # crm-services
//!
//! Permission-gated data access for CRM RS.
//!
//! Each operation takes the acting user (if any), checks it against the
//! permission resolver, validates input through a contract and only then
//! reaches storage. Failures are `CrmError`s carrying a user-facing message.

pub mod base;
pub mod clients;
pub mod follow_ups;
pub mod leads;
pub mod users;
pub mod work_time;

use std::sync::Arc;

use crm_auth::IdentityProvider;
use crm_db::{
    ClientRepository, ClientStore, Database, FollowUpRepository, FollowUpStore, LeadRepository,
    LeadStore, MemoryClientStore, MemoryFollowUpStore, MemoryLeadStore, MemoryUserStore,
    MemoryWorkTimeEventStore, UserRepository, UserStore, WorkTimeEventRepository,
    WorkTimeEventStore,
};

pub use base::{authorize, require_actor, ServiceSettings};
pub use clients::{ClientListParams, ClientService};
pub use follow_ups::{FollowUpService, SubjectKind};
pub use leads::{LeadListParams, LeadService};
pub use users::{UserListParams, UserService};
pub use work_time::WorkTimeService;

/// The storage backends the services run against
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub leads: Arc<dyn LeadStore>,
    pub clients: Arc<dyn ClientStore>,
    pub follow_ups: Arc<dyn FollowUpStore>,
    pub work_time: Arc<dyn WorkTimeEventStore>,
}

impl Stores {
    pub fn postgres(db: &Database) -> Self {
        let pool = db.pool().clone();
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            leads: Arc::new(LeadRepository::new(pool.clone())),
            clients: Arc::new(ClientRepository::new(pool.clone())),
            follow_ups: Arc::new(FollowUpRepository::new(pool.clone())),
            work_time: Arc::new(WorkTimeEventRepository::new(pool)),
        }
    }

    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            leads: Arc::new(MemoryLeadStore::new()),
            clients: Arc::new(MemoryClientStore::new()),
            follow_ups: Arc::new(MemoryFollowUpStore::new()),
            work_time: Arc::new(MemoryWorkTimeEventStore::new()),
        }
    }
}

/// All services, sharing one set of stores
pub struct Services {
    pub leads: LeadService,
    pub clients: ClientService,
    pub follow_ups: FollowUpService,
    pub users: UserService,
    pub work_time: WorkTimeService,
}

impl Services {
    pub fn new(
        stores: Stores,
        identity: Arc<dyn IdentityProvider>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            leads: LeadService::new(stores.leads.clone(), settings),
            clients: ClientService::new(stores.clients.clone(), settings),
            follow_ups: FollowUpService::new(
                stores.follow_ups.clone(),
                stores.leads.clone(),
                stores.clients.clone(),
                stores.users.clone(),
            ),
            users: UserService::new(stores.users, identity, settings),
            work_time: WorkTimeService::new(stores.work_time, settings),
        }
    }
}
