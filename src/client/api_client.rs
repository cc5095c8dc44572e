use super::RequestSpec;
use crate::auth::{AuthManager, Role};
use crate::config::HarnessConfig;
use crate::endpoints::{Endpoint, EndpointRegistry};
use crate::error::{HarnessError, Result};
use reqwest::header::HeaderValue;

/// Endpoint registry, HTTP client and token cache of one suite instance.
pub struct ApiClient {
    http: reqwest::Client,
    endpoints: EndpointRegistry,
    auth: AuthManager,
}

impl ApiClient {
    /// Builds the client without contacting the server.
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to build reqwest client");
        let endpoints = EndpointRegistry::new(&config.base_url, &config.api_prefix);
        let auth = AuthManager::new(
            http.clone(),
            endpoints.resolve(Endpoint::Token, &[])?,
            config.admin.clone(),
            config.user.clone(),
            config.token_lifetime,
        );
        Ok(Self {
            http,
            endpoints,
            auth,
        })
    }

    pub fn endpoints(&self) -> &EndpointRegistry {
        &self.endpoints
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut AuthManager {
        &mut self.auth
    }

    pub fn url(&self, endpoint: Endpoint, params: &[&str]) -> Result<String> {
        Ok(self.endpoints.resolve(endpoint, params)?)
    }

    /// JSON request spec for `role`, with the current token copied in.
    pub fn as_role(&self, role: Role) -> Result<RequestSpec> {
        let authorization = match self.auth.authorization(role)? {
            Some(value) => Some(HeaderValue::from_str(&value).map_err(|_| {
                HarnessError::Authentication {
                    username: self
                        .auth
                        .identity(role)
                        .map(|identity| identity.username.clone())
                        .unwrap_or_default(),
                    reason: "token is not a valid header value".to_string(),
                }
            })?),
            None => None,
        };
        Ok(RequestSpec::new(self.http.clone(), role, authorization))
    }
}
