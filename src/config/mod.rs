use ::config::builder::DefaultState;
use ::config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Postman mock server simulating the SFA API.
pub const DEFAULT_BASE_URL: &str = "https://1867013c-e0c3-4d78-b961-6bde86784ce5.mock.pstmn.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Optional settings file, looked up in the working directory (any format the
/// `config` crate understands, e.g. `sfa-contract.toml`).
pub const CONFIG_FILE: &str = "sfa-contract";
pub const ENV_PREFIX: &str = "SFA";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// How the delivery-not-possible rule treats a primary alert code it does not
/// recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPolicy {
    /// Unknown primary alert is an invalid-fixture failure.
    #[default]
    Strict,
    /// Unknown primary alert is permitted and noted.
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub timeout_secs: u64,
    pub alert_policy: AlertPolicy,
    pub report_format: ReportFormat,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            alert_policy: AlertPolicy::default(),
            report_format: ReportFormat::default(),
            log_json: false,
        }
    }
}

impl Config {
    /// Defaults, then the optional settings file, then `SFA_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Self::builder()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX));
        Self::from_builder(builder)
    }

    /// Builder pre-seeded with every default, ready for more sources.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let builder = ::config::Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
            .set_default("alert_policy", "strict")?
            .set_default("report_format", "text")?
            .set_default("log_json", false)?;
        Ok(builder)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".to_string()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "base_url must use http or https: {}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
