mod file_config;

pub use file_config::{FileConfig, IdentityConfig, ScenariosConfig};

use crate::models::Identity;
use crate::scenarios::Resource;
use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "stringst";
pub const DEFAULT_USER_USERNAME: &str = "TestUser";
pub const DEFAULT_USER_PASSWORD: &str = "TestUser";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Matches the server's 30 minute access token expiry.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 30 * 60;
pub const DEFAULT_ALBUM_ARTIST_ID: i64 = 5;
pub const DEFAULT_MISSING_ID: i64 = 0;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub admin_username: String,
    pub admin_password: String,
    pub user_username: String,
    pub user_password: String,
    pub request_timeout_secs: u64,
    pub token_lifetime_secs: u64,
    pub album_artist_id: i64,
    pub missing_id: i64,
    pub rights_target: Option<String>,
    pub resources: Vec<Resource>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            user_username: DEFAULT_USER_USERNAME.to_string(),
            user_password: DEFAULT_USER_PASSWORD.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
            album_artist_id: DEFAULT_ALBUM_ARTIST_ID,
            missing_id: DEFAULT_MISSING_ID,
            rights_target: None,
            resources: Vec::new(),
        }
    }
}

/// Inputs of the scenario suites that depend on server-side data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioSettings {
    pub album_artist_id: i64,
    pub missing_id: i64,
    pub rights_target: Option<String>,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            album_artist_id: DEFAULT_ALBUM_ARTIST_ID,
            missing_id: DEFAULT_MISSING_ID,
            rights_target: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub admin: Identity,
    pub user: Identity,
    pub request_timeout: Duration,
    pub token_lifetime: Duration,
    pub scenarios: ScenarioSettings,
    /// Never empty after resolution.
    pub resources: Vec<Resource>,
}

impl HarnessConfig {
    /// Defaults pointed at `base_url`.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            admin: Identity::new(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD),
            user: Identity::new(DEFAULT_USER_USERNAME, DEFAULT_USER_PASSWORD),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            token_lifetime: Duration::from_secs(DEFAULT_TOKEN_LIFETIME_SECS),
            scenarios: ScenarioSettings::default(),
            resources: Resource::ALL.to_vec(),
        }
    }

    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let base_url = file.base_url.unwrap_or_else(|| cli.base_url.clone());
        let base_url = validate_base_url(&base_url)?;
        let api_prefix = file.api_prefix.unwrap_or_else(|| cli.api_prefix.clone());

        let admin = resolve_identity(
            file.admin.unwrap_or_default(),
            &cli.admin_username,
            &cli.admin_password,
        );
        let user = resolve_identity(
            file.user.unwrap_or_default(),
            &cli.user_username,
            &cli.user_password,
        );
        if admin.username == user.username {
            bail!(
                "admin and user identities must differ, both are {:?}",
                admin.username
            );
        }

        let request_timeout_secs = file
            .request_timeout_secs
            .unwrap_or(cli.request_timeout_secs);
        if request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        let token_lifetime_secs = file.token_lifetime_secs.unwrap_or(cli.token_lifetime_secs);
        if token_lifetime_secs == 0 {
            bail!("token_lifetime_secs must be greater than zero");
        }

        let scenarios_file = file.scenarios.unwrap_or_default();
        let scenarios = ScenarioSettings {
            album_artist_id: scenarios_file
                .album_artist_id
                .unwrap_or(cli.album_artist_id),
            missing_id: scenarios_file.missing_id.unwrap_or(cli.missing_id),
            rights_target: scenarios_file
                .rights_target
                .or_else(|| cli.rights_target.clone()),
        };

        if let Some(target) = &scenarios.rights_target {
            if target.trim().is_empty() {
                bail!("rights_target must not be blank");
            }
        }
        // The server refuses to let an admin change their own rights.
        if scenarios.rights_target.as_deref() == Some(admin.username.as_str()) {
            bail!(
                "rights_target must not be the admin identity {:?}",
                admin.username
            );
        }

        let mut resources = match scenarios_file.resources {
            Some(names) => names
                .iter()
                .map(|name| {
                    Resource::from_str(name)
                        .with_context(|| format!("Unknown resource in config file: {:?}", name))
                })
                .collect::<Result<Vec<_>>>()?,
            None => cli.resources.clone(),
        };
        if resources.is_empty() {
            resources = Resource::ALL.to_vec();
        }
        resources.sort();
        resources.dedup();

        Ok(Self {
            base_url,
            api_prefix,
            admin,
            user,
            request_timeout: Duration::from_secs(request_timeout_secs),
            token_lifetime: Duration::from_secs(token_lifetime_secs),
            scenarios,
            resources,
        })
    }
}

fn resolve_identity(file: IdentityConfig, username: &str, password: &str) -> Identity {
    Identity {
        username: file.username.unwrap_or_else(|| username.to_string()),
        password: file.password.unwrap_or_else(|| password.to_string()),
        email: file.email,
    }
}

fn validate_base_url(raw: &str) -> Result<String> {
    let url = reqwest::Url::parse(raw).with_context(|| format!("Invalid base URL: {}", raw))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Base URL must use http or https: {}", raw);
    }
    if url.query().is_some() || url.fragment().is_some() {
        bail!("Base URL must not carry a query or fragment: {}", raw);
    }
    Ok(raw.trim_end_matches('/').to_string())
}
