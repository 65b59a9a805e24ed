//! Application configuration structs
//!
//! Loads configuration from built-in defaults, an optional config file, and
//! `PRESENCE_`-prefixed environment variables (in increasing precedence).

use std::env;
use std::time::Duration;

use chrono::TimeDelta;
use config::builder::DefaultState;
use config::ConfigBuilder;
use presence_core::{saturating_seconds, DecayPolicy};
use serde::Deserialize;

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_VAR: &str = "PRESENCE_CONFIG";
/// Config file looked up when `PRESENCE_CONFIG` is unset (extension optional)
const DEFAULT_CONFIG_FILE: &str = "presence";
/// Prefix of environment overrides, e.g. `PRESENCE_SERVER__PORT`
const ENV_PREFIX: &str = "PRESENCE";
/// Upper bound for every presence duration setting (365 days)
const MAX_PRESENCE_SECS: u64 = 365 * 24 * 3600;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub presence: PresenceConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            env: default_env(),
        }
    }
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Presence tracking configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceConfig {
    /// Idle seconds before an online user is shown as away
    #[serde(default = "default_away_after_secs")]
    pub away_after_secs: u64,
    /// Idle seconds before an away user is shown as offline
    #[serde(default = "default_offline_after_secs")]
    pub offline_after_secs: u64,
    /// Seconds between inactivity sweeps
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Default window for "recently active" queries
    #[serde(default = "default_recent_window_secs")]
    pub recent_window_secs: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            away_after_secs: default_away_after_secs(),
            offline_after_secs: default_offline_after_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            recent_window_secs: default_recent_window_secs(),
        }
    }
}

impl PresenceConfig {
    /// Decay thresholds for the tracker
    #[must_use]
    pub fn decay_policy(&self) -> DecayPolicy {
        DecayPolicy::from_secs(self.away_after_secs, self.offline_after_secs)
    }

    /// Period of the background sweeper
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Default "recently active" window
    #[must_use]
    pub fn recent_window(&self) -> TimeDelta {
        saturating_seconds(self.recent_window_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_range("presence.away_after_secs", self.away_after_secs)?;
        check_range("presence.offline_after_secs", self.offline_after_secs)?;
        check_range("presence.sweep_interval_secs", self.sweep_interval_secs)?;
        check_range("presence.recent_window_secs", self.recent_window_secs)?;

        if self.offline_after_secs <= self.away_after_secs {
            return Err(ConfigError::InvalidValue(
                "presence.offline_after_secs",
                format!("must be greater than away_after_secs ({})", self.away_after_secs),
            ));
        }
        Ok(())
    }
}

fn check_range(key: &'static str, secs: u64) -> Result<(), ConfigError> {
    if secs == 0 || secs > MAX_PRESENCE_SECS {
        return Err(ConfigError::InvalidValue(
            key,
            format!("must be between 1 and {MAX_PRESENCE_SECS} seconds, got {secs}"),
        ));
    }
    Ok(())
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

// Default value functions
fn default_app_name() -> String {
    "presence-server".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_away_after_secs() -> u64 {
    300 // 5 minutes
}

fn default_offline_after_secs() -> u64 {
    900 // 15 minutes
}

fn default_sweep_interval_secs() -> u64 {
    30
}

fn default_recent_window_secs() -> u64 {
    3600 // 1 hour
}

impl AppConfig {
    /// Load configuration from the config file and environment variables
    ///
    /// A `.env` file is read first if present. The config file is optional.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let builder = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(env_source());

        Self::from_builder(builder)
    }

    /// Build and validate configuration from prepared sources
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.presence.validate()?;
        Ok(config)
    }
}

/// Environment source: `PRESENCE_SECTION__KEY=value`, lists comma separated
fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("cors.allowed_origins")
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
