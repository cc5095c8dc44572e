use anyhow::{Context, Result};
use clap::Parser;
use records_store_conformance::config::{
    DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME, DEFAULT_ALBUM_ARTIST_ID, DEFAULT_API_PREFIX,
    DEFAULT_BASE_URL, DEFAULT_MISSING_ID, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_TOKEN_LIFETIME_SECS, DEFAULT_USER_PASSWORD, DEFAULT_USER_USERNAME,
};
use records_store_conformance::{CliConfig, ConformanceSuite, FileConfig, HarnessConfig, Resource};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Base URL of the server under test.
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Path prefix shared by every API endpoint.
    #[clap(long, default_value = DEFAULT_API_PREFIX)]
    pub api_prefix: String,

    #[clap(long, default_value = DEFAULT_ADMIN_USERNAME)]
    pub admin_username: String,

    #[clap(long, default_value = DEFAULT_ADMIN_PASSWORD)]
    pub admin_password: String,

    #[clap(long, default_value = DEFAULT_USER_USERNAME)]
    pub user_username: String,

    #[clap(long, default_value = DEFAULT_USER_PASSWORD)]
    pub user_password: String,

    /// Timeout in seconds for every request.
    #[clap(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Seconds after which a token is re-acquired between resource suites.
    #[clap(long, default_value_t = DEFAULT_TOKEN_LIFETIME_SECS)]
    pub token_lifetime_secs: u64,

    /// Existing artist that generated albums reference.
    #[clap(long, default_value_t = DEFAULT_ALBUM_ARTIST_ID)]
    pub album_artist_id: i64,

    /// Record id that must not exist on the server.
    #[clap(long, default_value_t = DEFAULT_MISSING_ID, allow_hyphen_values = true)]
    pub missing_id: i64,

    /// Existing username for the rights scenarios. A fresh user is registered when omitted.
    #[clap(long)]
    pub rights_target: Option<String>,

    /// Resource suite to run. Can be repeated; all suites run when omitted.
    #[clap(long = "suite", value_enum)]
    pub suites: Vec<Resource>,

    /// Path to a TOML config file. Values in the file override the flags above.
    #[clap(long)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            base_url: self.base_url.clone(),
            api_prefix: self.api_prefix.clone(),
            admin_username: self.admin_username.clone(),
            admin_password: self.admin_password.clone(),
            user_username: self.user_username.clone(),
            user_password: self.user_password.clone(),
            request_timeout_secs: self.request_timeout_secs,
            token_lifetime_secs: self.token_lifetime_secs,
            album_artist_id: self.album_artist_id,
            missing_id: self.missing_id,
            rights_target: self.rights_target.clone(),
            resources: self.suites.clone(),
        }
    }
}

fn load_config(cli_args: &CliArgs) -> Result<HarnessConfig> {
    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;
    HarnessConfig::resolve(&cli_args.to_cli_config(), file_config)
        .context("Invalid harness configuration")
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let config = match load_config(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            error!("{:#}", err);
            return ExitCode::from(2);
        }
    };

    info!(
        "Running {:?} against {}{}",
        config.resources, config.base_url, config.api_prefix
    );

    let mut suite = match ConformanceSuite::setup(&config).await {
        Ok(suite) => suite,
        Err(err) => {
            error!("Setup failed: {}", err);
            return ExitCode::from(2);
        }
    };

    let summary = suite.run().await;

    for failure in summary.failures() {
        if let Some(err) = &failure.error {
            error!("{} (expected {}): {}", failure.name, failure.expected, err);
        }
    }
    info!(
        "{} scenario(s): {} passed, {} failed",
        summary.outcomes.len(),
        summary.passed(),
        summary.failed()
    );

    if let Some(err) = &summary.aborted {
        error!("Run aborted: {}", err);
        return ExitCode::from(2);
    }
    if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
