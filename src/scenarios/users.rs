//! Registration and admin-rights scenarios.

use super::crud::expect_field;
use super::{Operation, Resource, ResourceSuite, Scenario, SuiteContext, Target, Validity};
use crate::auth::Role;
use crate::client::RequestSpec;
use crate::endpoints::Endpoint;
use crate::error::{AssertionFailure, Result};
use crate::fixtures::generate_name;
use crate::models::{RegisterRequest, RightsPatch, User};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::json;
use tracing::info;

pub struct UsersSuite;

impl UsersSuite {
    /// Registers a generated user anonymously and returns the created record.
    pub async fn register_fixture(&self, ctx: SuiteContext<'_>) -> Result<User> {
        let anonymous = ctx.as_role(Role::Anonymous)?;
        let request = RegisterRequest::generated();
        let user: User = anonymous
            .send(anonymous.post(&ctx.url(Endpoint::Register, &[])?).json(&request))
            .await?
            .expect_json(StatusCode::OK)?;
        Ok(user)
    }

    /// Configured rights target, or a freshly registered user.
    async fn rights_target(&self, ctx: SuiteContext<'_>) -> Result<String> {
        match &ctx.settings.rights_target {
            Some(username) => Ok(username.clone()),
            None => Ok(self.register_fixture(ctx).await?.username),
        }
    }

    async fn register(
        &self,
        ctx: SuiteContext<'_>,
        spec: &RequestSpec,
        scenario: &Scenario,
    ) -> Result<()> {
        let request = match scenario.case.data {
            Validity::Valid => RegisterRequest::generated(),
            Validity::Invalid => RegisterRequest::with_malformed_email(),
        };
        let response = spec
            .send(spec.post(&ctx.url(Endpoint::Register, &[])?).json(&request))
            .await?;
        if scenario.expected != StatusCode::OK {
            response.expect_status(scenario.expected)?;
            return Ok(());
        }

        let user: User = response.expect_json(StatusCode::OK)?;
        if !user.matches(&request) {
            return Err(AssertionFailure::Check(format!(
                "registered {:?} <{}> but server returned {:?} <{}>",
                request.username, request.email, user.username, user.email
            ))
            .into());
        }
        info!("User {} registered with id {}", user.username, user.id);
        Ok(())
    }

    async fn patch_rights<B: Serialize + Sync>(
        &self,
        ctx: SuiteContext<'_>,
        spec: &RequestSpec,
        username: &str,
        body: &B,
        expected: StatusCode,
    ) -> Result<Option<User>> {
        let response = spec
            .send(
                spec.patch(&ctx.url(Endpoint::UserRights, &[username])?)
                    .json(body),
            )
            .await?;
        if expected != StatusCode::OK {
            response.expect_status(expected)?;
            return Ok(None);
        }
        Ok(Some(response.expect_json(StatusCode::OK)?))
    }

    async fn change_rights(
        &self,
        ctx: SuiteContext<'_>,
        spec: &RequestSpec,
        scenario: &Scenario,
    ) -> Result<()> {
        let username = match scenario.case.target {
            Target::Existing => self.rights_target(ctx).await?,
            // Generated names are never registered by this scenario.
            Target::Missing => generate_name(),
        };

        if scenario.case.data == Validity::Invalid {
            let body = json!({ "is_admin": "test" });
            self.patch_rights(ctx, spec, &username, &body, scenario.expected)
                .await?;
            return Ok(());
        }

        // Grant, then revoke. The target always ends without admin rights.
        for is_admin in [true, false] {
            let updated = self
                .patch_rights(
                    ctx,
                    spec,
                    &username,
                    &RightsPatch { is_admin },
                    scenario.expected,
                )
                .await?;
            let Some(user) = updated else {
                return Ok(());
            };
            expect_field("username", &username, &user.username)?;
            expect_field("is_admin", &is_admin, &user.is_admin)?;
            info!("User {} is_admin set to {}", user.username, user.is_admin);
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceSuite for UsersSuite {
    fn resource(&self) -> Resource {
        Resource::Users
    }

    async fn run(&self, ctx: SuiteContext<'_>, scenario: &Scenario) -> Result<()> {
        let spec = ctx.as_role(scenario.case.role)?;
        match scenario.case.operation {
            Operation::Register => self.register(ctx, &spec, scenario).await,
            Operation::ChangeRights => self.change_rights(ctx, &spec, scenario).await,
            other => Err(AssertionFailure::Check(format!(
                "users do not support {}",
                other.as_str()
            ))
            .into()),
        }
    }
}
