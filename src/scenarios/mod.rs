//! Scenario suites: the contract table applied to each resource.

mod albums;
mod artists;
pub mod contract;
mod crud;
mod runner;
mod users;

pub use albums::Albums;
pub use artists::Artists;
pub use contract::{
    expected_status, scenarios, Case, Operation, Resource, Scenario, Target, Validity,
};
pub use crud::{CrudResource, CrudSuite};
pub use runner::{ConformanceSuite, ScenarioOutcome, SuiteSummary};
pub use users::UsersSuite;

use crate::auth::Role;
use crate::client::{ApiClient, RequestSpec};
use crate::config::ScenarioSettings;
use crate::endpoints::Endpoint;
use crate::error::Result;
use async_trait::async_trait;

/// What a scenario can reach: the authenticated client and the run settings.
#[derive(Clone, Copy)]
pub struct SuiteContext<'a> {
    pub client: &'a ApiClient,
    pub settings: &'a ScenarioSettings,
}

impl<'a> SuiteContext<'a> {
    pub fn new(client: &'a ApiClient, settings: &'a ScenarioSettings) -> Self {
        Self { client, settings }
    }

    pub fn as_role(&self, role: Role) -> Result<RequestSpec> {
        self.client.as_role(role)
    }

    pub fn url(&self, endpoint: Endpoint, params: &[&str]) -> Result<String> {
        self.client.url(endpoint, params)
    }

    pub fn missing_id(&self) -> String {
        self.settings.missing_id.to_string()
    }
}

#[async_trait]
pub trait ResourceSuite: Send + Sync {
    fn resource(&self) -> Resource;

    /// Runs one scenario. `Ok` means the server honoured the contract.
    async fn run(&self, ctx: SuiteContext<'_>, scenario: &Scenario) -> Result<()>;
}

/// The suite exercising `resource`.
pub fn suite_for(resource: Resource) -> Box<dyn ResourceSuite> {
    match resource {
        Resource::Artists => Box::new(CrudSuite::<Artists>::new()),
        Resource::Albums => Box::new(CrudSuite::<Albums>::new()),
        Resource::Users => Box::new(UsersSuite),
    }
}
