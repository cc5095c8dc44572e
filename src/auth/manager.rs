//! Per-identity bearer tokens.
//!
//! Tokens are acquired once, before any scenario runs, and read many times
//! afterwards. Each manager owns its own cache, so isolated runners never share
//! tokens.

use super::Role;
use crate::error::{HarnessError, Result};
use crate::models::{Identity, Token};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: Token,
    acquired_at: Instant,
}

pub struct AuthManager {
    http: reqwest::Client,
    token_url: String,
    identities: HashMap<Role, Identity>,
    tokens: HashMap<Role, CachedToken>,
    token_lifetime: Duration,
}

impl AuthManager {
    pub fn new(
        http: reqwest::Client,
        token_url: String,
        admin: Identity,
        user: Identity,
        token_lifetime: Duration,
    ) -> Self {
        let identities = HashMap::from([(Role::Admin, admin), (Role::User, user)]);
        Self {
            http,
            token_url,
            identities,
            tokens: HashMap::new(),
            token_lifetime,
        }
    }

    pub fn identity(&self, role: Role) -> Option<&Identity> {
        self.identities.get(&role)
    }

    pub fn state(&self, role: Role) -> AuthState {
        if self.tokens.contains_key(&role) {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    /// Acquires a token for every configured identity. Stops at the first failure.
    pub async fn authenticate_all(&mut self) -> Result<()> {
        for role in Role::AUTHENTICATED {
            self.authenticate(role).await?;
        }
        Ok(())
    }

    async fn authenticate(&mut self, role: Role) -> Result<()> {
        let identity = self
            .identities
            .get(&role)
            .ok_or(HarnessError::TokenNotAcquired(role))?;
        let token = self.exchange(identity).await?;
        info!(
            "Acquired {} token for {} identity {}",
            token.token_type, role, identity.username
        );
        self.tokens.insert(
            role,
            CachedToken {
                token,
                acquired_at: Instant::now(),
            },
        );
        Ok(())
    }

    /// Form-encoded credential exchange against the token endpoint.
    pub async fn exchange(&self, identity: &Identity) -> Result<Token> {
        let failed = |reason: String| HarnessError::Authentication {
            username: identity.username.clone(),
            reason,
        };

        debug!("Requesting token for {}", identity.username);
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("username", identity.username.as_str()),
                ("password", identity.password.as_str()),
            ])
            .send()
            .await
            .map_err(|err| failed(format!("token request failed: {}", err)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| failed(format!("could not read token response: {}", err)))?;

        if status != StatusCode::OK {
            return Err(failed(format!("status {}: {}", status, body)));
        }

        serde_json::from_str(&body)
            .map_err(|err| failed(format!("malformed token response: {}", err)))
    }

    pub fn token(&self, role: Role) -> Option<&Token> {
        self.tokens.get(&role).map(|cached| &cached.token)
    }

    /// `Authorization` header value for `role`, copied from the cache.
    ///
    /// Anonymous requests carry no header. Asking for a role that was never
    /// authenticated is a [`HarnessError::TokenNotAcquired`].
    pub fn authorization(&self, role: Role) -> Result<Option<String>> {
        if !role.requires_token() {
            return Ok(None);
        }
        self.token(role)
            .map(|token| Some(token.authorization_value()))
            .ok_or(HarnessError::TokenNotAcquired(role))
    }

    /// Roles whose token is at least `token_lifetime` old at `now`.
    pub fn expired_roles(&self, now: Instant) -> Vec<Role> {
        let mut expired: Vec<Role> = self
            .tokens
            .iter()
            .filter(|(_, cached)| {
                now.saturating_duration_since(cached.acquired_at) >= self.token_lifetime
            })
            .map(|(role, _)| *role)
            .collect();
        expired.sort();
        expired
    }

    /// Re-runs the exchange for expired tokens and returns the refreshed roles.
    pub async fn refresh_expired(&mut self) -> Result<Vec<Role>> {
        let expired = self.expired_roles(Instant::now());
        for role in &expired {
            info!("Token for {} identity expired, re-authenticating", role);
            self.authenticate(*role).await?;
        }
        Ok(expired)
    }
}
