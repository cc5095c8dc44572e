use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub base_url: Option<String>,
    pub api_prefix: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub token_lifetime_secs: Option<u64>,

    // Identities
    pub admin: Option<IdentityConfig>,
    pub user: Option<IdentityConfig>,

    pub scenarios: Option<ScenariosConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct IdentityConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ScenariosConfig {
    /// Existing artist that album fixtures are attached to.
    pub album_artist_id: Option<i64>,
    /// Id that no record on the server has.
    pub missing_id: Option<i64>,
    /// Username whose admin flag the rights scenarios toggle.
    pub rights_target: Option<String>,
    /// Resource suites to run: "artists", "albums", "users"
    pub resources: Option<Vec<String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
