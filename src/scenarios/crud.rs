//! Create/list/read/update/delete scenarios shared by the catalog resources.

use super::{Operation, Resource, ResourceSuite, Scenario, SuiteContext, Target, Validity};
use crate::auth::Role;
use crate::client::{ParamMap, RequestSpec};
use crate::config::ScenarioSettings;
use crate::endpoints::Endpoint;
use crate::error::{AssertionFailure, HarnessError, Result};
use crate::fixtures::MARKER;
use crate::models::{find_tagged, Tagged};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::info;

/// Query that every list endpoint rejects with 422.
const INVALID_LIST_QUERY: [(&str, &str); 2] = [("skip", "test"), ("limit", "test")];

/// A catalog resource with admin-only writes and authenticated reads.
pub trait CrudResource: Send + Sync + 'static {
    type Payload: Serialize + Debug + Send + Sync;
    type Record: DeserializeOwned + Tagged + Clone + Debug + Send + Sync;

    const RESOURCE: Resource;
    const COLLECTION: Endpoint;
    const ITEM: Endpoint;

    fn payload(settings: &ScenarioSettings, data: Validity) -> Self::Payload;

    /// Every input field must come back unchanged.
    fn check_echo(
        record: &Self::Record,
        payload: &Self::Payload,
    ) -> std::result::Result<(), AssertionFailure>;

    /// Query of the authorized list scenario.
    fn list_params() -> ParamMap {
        ParamMap::new()
    }

    /// Extra checks on the authorized list result, which is already known to be non-empty.
    fn check_list(_records: &[Self::Record]) -> std::result::Result<(), AssertionFailure> {
        Ok(())
    }
}

pub struct CrudSuite<R> {
    _resource: PhantomData<fn() -> R>,
}

impl<R: CrudResource> CrudSuite<R> {
    pub fn new() -> Self {
        Self {
            _resource: PhantomData,
        }
    }

    /// Creates a record as admin and returns it with the payload that produced it.
    pub async fn create_fixture(
        &self,
        ctx: SuiteContext<'_>,
    ) -> Result<(R::Record, R::Payload)> {
        let admin = ctx.as_role(Role::Admin)?;
        let payload = R::payload(ctx.settings, Validity::Valid);
        let record: R::Record = admin
            .send(admin.post(&ctx.url(R::COLLECTION, &[])?).json(&payload))
            .await?
            .expect_json(StatusCode::CREATED)?;
        Ok((record, payload))
    }

    /// First harness-created record in the admin listing.
    pub async fn find_fixture(&self, ctx: SuiteContext<'_>) -> Result<R::Record> {
        let admin = ctx.as_role(Role::Admin)?;
        let records: Vec<R::Record> = admin
            .send(admin.get(&ctx.url(R::COLLECTION, &[])?))
            .await?
            .expect_json(StatusCode::OK)?;
        find_tagged(&records, MARKER)
            .cloned()
            .ok_or_else(|| HarnessError::FixtureLookup {
                resource: R::RESOURCE.as_str(),
                marker: MARKER.to_string(),
            })
    }

    async fn create(
        &self,
        ctx: SuiteContext<'_>,
        spec: &RequestSpec,
        scenario: &Scenario,
    ) -> Result<()> {
        let payload = R::payload(ctx.settings, scenario.case.data);
        let response = spec
            .send(spec.post(&ctx.url(R::COLLECTION, &[])?).json(&payload))
            .await?;
        if scenario.expected != StatusCode::CREATED {
            response.expect_status(scenario.expected)?;
            return Ok(());
        }

        let record: R::Record = response.expect_json(StatusCode::CREATED)?;
        R::check_echo(&record, &payload)?;
        info!(
            "{} record {} created with {:?}",
            R::RESOURCE,
            record.id(),
            record.tag_field()
        );
        Ok(())
    }

    async fn list(
        &self,
        ctx: SuiteContext<'_>,
        spec: &RequestSpec,
        scenario: &Scenario,
    ) -> Result<()> {
        let url = ctx.url(R::COLLECTION, &[])?;
        let request = match scenario.case.data {
            Validity::Valid => spec.get(&url).query(&R::list_params()),
            Validity::Invalid => spec.get(&url).query(&INVALID_LIST_QUERY),
        };

        if scenario.expected != StatusCode::OK {
            spec.send(request).await?.expect_status(scenario.expected)?;
            return Ok(());
        }

        // The list must not depend on fixtures left by other scenarios.
        self.create_fixture(ctx).await?;
        let records: Vec<R::Record> = spec.send(request).await?.expect_json(StatusCode::OK)?;
        if records.is_empty() {
            return Err(AssertionFailure::Check(format!(
                "{} list is empty after creating a fixture",
                R::RESOURCE
            ))
            .into());
        }
        R::check_list(&records)?;
        info!("{} list returned {} record(s)", R::RESOURCE, records.len());
        Ok(())
    }

    async fn read(
        &self,
        ctx: SuiteContext<'_>,
        spec: &RequestSpec,
        scenario: &Scenario,
    ) -> Result<()> {
        let (id, fixture) = match scenario.case.target {
            Target::Existing => {
                let (record, payload) = self.create_fixture(ctx).await?;
                (record.id().to_string(), Some(payload))
            }
            Target::Missing => (ctx.missing_id(), None),
        };

        let response = spec.send(spec.get(&ctx.url(R::ITEM, &[&id])?)).await?;
        match fixture {
            Some(payload) if scenario.expected == StatusCode::OK => {
                let record: R::Record = response.expect_json(StatusCode::OK)?;
                check_id(&record, &id)?;
                R::check_echo(&record, &payload)?;
            }
            _ => {
                response.expect_status(scenario.expected)?;
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: SuiteContext<'_>,
        spec: &RequestSpec,
        scenario: &Scenario,
    ) -> Result<()> {
        let id = match scenario.case.target {
            Target::Existing => self.create_fixture(ctx).await?.0.id().to_string(),
            Target::Missing => ctx.missing_id(),
        };

        let payload = R::payload(ctx.settings, scenario.case.data);
        let response = spec
            .send(spec.put(&ctx.url(R::ITEM, &[&id])?).json(&payload))
            .await?;
        if scenario.expected != StatusCode::OK {
            response.expect_status(scenario.expected)?;
            return Ok(());
        }

        let record: R::Record = response.expect_json(StatusCode::OK)?;
        check_id(&record, &id)?;
        R::check_echo(&record, &payload)?;
        info!("{} record {} updated", R::RESOURCE, id);
        Ok(())
    }

    async fn delete(
        &self,
        ctx: SuiteContext<'_>,
        spec: &RequestSpec,
        scenario: &Scenario,
    ) -> Result<()> {
        let (id, tag) = match scenario.case.target {
            Target::Existing => {
                let record = self.find_fixture(ctx).await?;
                let tag = record.tag_field().map(str::to_string);
                (record.id().to_string(), tag)
            }
            Target::Missing => (ctx.missing_id(), None),
        };

        let url = ctx.url(R::ITEM, &[&id])?;
        spec.send(spec.delete(&url))
            .await?
            .expect_status(scenario.expected)?;
        if scenario.expected != StatusCode::NO_CONTENT {
            return Ok(());
        }

        let admin = ctx.as_role(Role::Admin)?;
        admin
            .send(admin.get(&url))
            .await?
            .expect_status(StatusCode::NOT_FOUND)?;
        info!("{} record {} ({:?}) deleted", R::RESOURCE, id, tag);
        Ok(())
    }
}

impl<R: CrudResource> Default for CrudSuite<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_id<T: Tagged>(record: &T, id: &str) -> std::result::Result<(), AssertionFailure> {
    if record.id().to_string() == id {
        Ok(())
    } else {
        Err(AssertionFailure::field("id", id, record.id()))
    }
}

#[async_trait]
impl<R: CrudResource> ResourceSuite for CrudSuite<R> {
    fn resource(&self) -> Resource {
        R::RESOURCE
    }

    async fn run(&self, ctx: SuiteContext<'_>, scenario: &Scenario) -> Result<()> {
        let spec = ctx.as_role(scenario.case.role)?;
        match scenario.case.operation {
            Operation::Create => self.create(ctx, &spec, scenario).await,
            Operation::List => self.list(ctx, &spec, scenario).await,
            Operation::Read => self.read(ctx, &spec, scenario).await,
            Operation::Update => self.update(ctx, &spec, scenario).await,
            Operation::Delete => self.delete(ctx, &spec, scenario).await,
            other => Err(AssertionFailure::Check(format!(
                "{} does not support {}",
                R::RESOURCE,
                other.as_str()
            ))
            .into()),
        }
    }
}

/// Shorthand for resources comparing a record field against its payload.
pub(crate) fn expect_field<T: PartialEq + Debug>(
    field: &'static str,
    expected: &T,
    actual: &T,
) -> std::result::Result<(), AssertionFailure> {
    if expected == actual {
        Ok(())
    } else {
        Err(AssertionFailure::field(field, expected, actual))
    }
}
