use super::{scenarios, suite_for, Resource, Scenario, SuiteContext};
use crate::client::ApiClient;
use crate::config::{HarnessConfig, ScenarioSettings};
use crate::error::{HarnessError, Result};
use reqwest::StatusCode;
use tracing::{error, info, warn};

/// Result of one scenario. `error` is `None` when it passed.
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub name: String,
    pub expected: StatusCode,
    pub error: Option<HarnessError>,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcomes recorded so far. `aborted` holds the fatal error that stopped the run early.
#[derive(Debug, Default)]
pub struct SuiteSummary {
    pub outcomes: Vec<ScenarioOutcome>,
    pub aborted: Option<HarnessError>,
}

impl SuiteSummary {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    pub fn is_success(&self) -> bool {
        self.aborted.is_none() && self.failed() == 0
    }

    pub fn outcome(&self, name: &str) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    fn extend(&mut self, other: SuiteSummary) {
        self.outcomes.extend(other.outcomes);
        if self.aborted.is_none() {
            self.aborted = other.aborted;
        }
    }
}

/// Authenticated client plus the resources selected for the run.
pub struct ConformanceSuite {
    client: ApiClient,
    settings: ScenarioSettings,
    resources: Vec<Resource>,
}

impl ConformanceSuite {
    /// Builds the client and acquires a token for every identity.
    ///
    /// Any authentication failure is returned before a single scenario runs.
    pub async fn setup(config: &HarnessConfig) -> Result<Self> {
        let mut client = ApiClient::new(config)?;
        info!("Authenticating against {}", client.endpoints().root());
        client.auth_mut().authenticate_all().await?;
        Ok(Self {
            client,
            settings: config.scenarios.clone(),
            resources: config.resources.clone(),
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Runs every selected resource suite in order.
    ///
    /// Expired tokens are refreshed between suites, never inside one. A fatal
    /// error stops the run and the outcomes recorded before it are kept.
    pub async fn run(&mut self) -> SuiteSummary {
        let mut summary = SuiteSummary::default();
        for resource in self.resources.clone() {
            match self.client.auth_mut().refresh_expired().await {
                Ok(refreshed) if !refreshed.is_empty() => {
                    info!("Refreshed tokens for {:?} before {}", refreshed, resource);
                }
                Ok(_) => {}
                Err(err) => {
                    error!("Token refresh before {} aborted the run: {}", resource, err);
                    summary.aborted = Some(err);
                    break;
                }
            }
            summary.extend(self.run_resource(resource).await);
            if summary.aborted.is_some() {
                break;
            }
        }

        info!(
            "Conformance run finished: {} passed, {} failed",
            summary.passed(),
            summary.failed()
        );
        summary
    }

    /// Runs the scenarios of one resource. A fatal error ends it early and is
    /// stored in `aborted`.
    pub async fn run_resource(&self, resource: Resource) -> SuiteSummary {
        let mut summary = SuiteSummary::default();
        let scenarios = scenarios(resource);
        info!("Running {} {} scenario(s)", scenarios.len(), resource);

        for scenario in &scenarios {
            let name = scenario.name();
            match self.run_scenario(scenario).await {
                Ok(()) => {
                    info!("PASS {}", name);
                    summary.outcomes.push(ScenarioOutcome {
                        name,
                        expected: scenario.expected,
                        error: None,
                    });
                }
                Err(err) if err.is_fatal() => {
                    error!("{} aborted the run: {}", name, err);
                    summary.aborted = Some(err);
                    break;
                }
                Err(err) => {
                    error!("FAIL {}: {}", name, err);
                    summary.outcomes.push(ScenarioOutcome {
                        name,
                        expected: scenario.expected,
                        error: Some(err),
                    });
                }
            }
        }

        if !summary.is_success() {
            warn!("{}: {} of {} failed", resource, summary.failed(), scenarios.len());
        }
        summary
    }

    pub async fn run_scenario(&self, scenario: &Scenario) -> Result<()> {
        let ctx = SuiteContext::new(&self.client, &self.settings);
        suite_for(scenario.case.resource).run(ctx, scenario).await
    }
}
