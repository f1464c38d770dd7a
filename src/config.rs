//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.hrmatchups.toml` files.

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::models::GAME_LOG_WINDOW;
use crate::statsapi::client::{StatsApiConfig, STATSAPI_URL};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".hrmatchups.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream Stats API settings.
    #[serde(default)]
    pub statsapi: StatsApiSection,

    /// Aggregation settings.
    #[serde(default)]
    pub aggregator: AggregatorConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Inbound HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// `s-maxage` advertised to downstream caches, in seconds.
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cache_max_age_seconds: default_cache_max_age(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_cache_max_age() -> u64 {
    3600
}

/// MLB Stats API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsApiSection {
    /// Base URL of the API.
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Sport id (1 = MLB).
    #[serde(default = "default_sport_id")]
    pub sport_id: u32,

    /// Games requested per game log.
    #[serde(default = "default_game_log_limit")]
    pub game_log_limit: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User-Agent header sent upstream.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for StatsApiSection {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            sport_id: default_sport_id(),
            game_log_limit: default_game_log_limit(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_api_url() -> String {
    STATSAPI_URL.to_string()
}

fn default_sport_id() -> u32 {
    1
}

fn default_game_log_limit() -> usize {
    20
}

fn default_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("hrmatchups/{}", env!("CARGO_PKG_VERSION"))
}

/// Aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Maximum upstream requests in flight at once.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Per-run deadline for roster and batter lookups, in seconds.
    #[serde(default = "default_deadline")]
    pub deadline_seconds: u64,

    /// IANA time zone used to decide what "today" is.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
            deadline_seconds: default_deadline(),
            timezone: default_timezone(),
        }
    }
}

fn default_max_in_flight() -> usize {
    8
}

fn default_deadline() -> u64 {
    25
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl AggregatorConfig {
    /// Parse the configured time zone.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid time zone '{}': {}", self.timezone, e))
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_seconds)
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref bind) = args.bind {
            self.server.bind = bind.clone();
        }
        if let Some(ref api_url) = args.api_url {
            self.statsapi.base_url = api_url.trim_end_matches('/').to_string();
        }
        if let Some(max_in_flight) = args.max_in_flight {
            self.aggregator.max_in_flight = max_in_flight;
        }
        if let Some(deadline) = args.deadline {
            self.aggregator.deadline_seconds = deadline;
        }
        if let Some(ref timezone) = args.timezone {
            self.aggregator.timezone = timezone.clone();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check values that serde alone cannot.
    pub fn validate(&self) -> Result<()> {
        if self.aggregator.max_in_flight == 0 {
            return Err(anyhow!("aggregator.max_in_flight must be at least 1"));
        }
        if self.aggregator.deadline_seconds == 0 {
            return Err(anyhow!("aggregator.deadline_seconds must be at least 1"));
        }
        if self.statsapi.timeout_seconds == 0 {
            return Err(anyhow!("statsapi.timeout_seconds must be at least 1"));
        }
        if self.statsapi.game_log_limit < GAME_LOG_WINDOW {
            return Err(anyhow!(
                "statsapi.game_log_limit must be at least {0} to fill the last-{0} window",
                GAME_LOG_WINDOW
            ));
        }
        self.aggregator.tz()?;
        Ok(())
    }

    /// Build the Stats API client configuration.
    pub fn statsapi_config(&self) -> StatsApiConfig {
        StatsApiConfig {
            base_url: self.statsapi.base_url.trim_end_matches('/').to_string(),
            sport_id: self.statsapi.sport_id,
            game_log_limit: self.statsapi.game_log_limit,
            timeout_seconds: self.statsapi.timeout_seconds,
            max_in_flight: self.aggregator.max_in_flight,
            user_agent: self.statsapi.user_agent.clone(),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.server.cache_max_age_seconds, 3600);
        assert_eq!(config.statsapi.base_url, STATSAPI_URL);
        assert_eq!(config.aggregator.max_in_flight, 8);
        assert_eq!(config.aggregator.tz().unwrap(), Tz::UTC);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[server]
bind = "0.0.0.0:8080"

[statsapi]
base_url = "http://localhost:9999/api/v1/"
timeout_seconds = 3

[aggregator]
max_in_flight = 2
timezone = "America/New_York"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.server.cache_max_age_seconds, 3600);
        assert_eq!(config.statsapi.timeout_seconds, 3);
        assert_eq!(config.statsapi.game_log_limit, 20);
        assert_eq!(config.aggregator.deadline_seconds, 25);
        assert_eq!(config.aggregator.tz().unwrap(), chrono_tz::America::New_York);

        let client = config.statsapi_config();
        assert_eq!(client.base_url, "http://localhost:9999/api/v1");
        assert_eq!(client.max_in_flight, 2);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.aggregator.timezone = "Mars/Olympus_Mons".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.aggregator.max_in_flight = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_short_game_log() {
        let mut config = Config::default();
        config.statsapi.game_log_limit = GAME_LOG_WINDOW - 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("game_log_limit"));

        config.statsapi.game_log_limit = GAME_LOG_WINDOW;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\ncache_max_age_seconds = 60").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.cache_max_age_seconds, 60);
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nbind = ").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[statsapi]"));
        assert!(toml_str.contains("[aggregator]"));
    }
}
