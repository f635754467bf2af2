//! Startup Settings
//!
//! Layered from built-in defaults, an optional TOML file and environment
//! variables (`INFRA__SECTION__KEY`). The Slack credentials are also read
//! from the conventional `SLACK_BOT_TOKEN` / `SLACK_CHANNEL_ID` variables,
//! which take precedence.

use config::{Config, ConfigError, Environment, File};
use notifier::SlackConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Default settings file location, overridable with `INFRA_CONFIG`
pub const DEFAULT_CONFIG_PATH: &str = "config/infra-monitor.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub data: DataSettings,
    pub slack: SlackSettings,
    pub logging: LoggingSettings,
    pub metrics: MetricsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Listen address, e.g. `127.0.0.1:5000`
    pub bind_address: String,
}

/// Locations of the three persisted documents
#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    pub servers_file: PathBuf,
    pub alert_state_file: PathBuf,
    pub alert_config_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackSettings {
    pub bot_token: Option<String>,
    pub channel_id: Option<String>,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl SlackSettings {
    /// Client configuration, or `None` when token or channel is missing
    pub fn client_config(&self) -> Option<SlackConfig> {
        let token = self.bot_token.as_deref().filter(|t| !t.trim().is_empty())?;
        let channel = self.channel_id.as_deref().filter(|c| !c.trim().is_empty())?;

        Some(SlackConfig {
            api_base: self.api_base.clone(),
            bot_token: token.to_string(),
            channel_id: channel.to_string(),
            timeout_secs: self.timeout_secs,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

impl LoggingSettings {
    /// Parsed `level`; unknown names are rejected rather than defaulted
    pub fn max_level(&self) -> Result<Level, ConfigError> {
        self.level.parse::<Level>().map_err(|_| {
            ConfigError::Message(format!("invalid logging.level '{}'", self.level))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// Install the Prometheus recorder and serve `/metrics`
    pub enabled: bool,
}

impl Settings {
    /// Load from `INFRA_CONFIG` or the default path
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("INFRA_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_file(path)
    }

    /// Load using `path` as the (optional) settings file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.bind_address", "127.0.0.1:5000")?
            .set_default("data.servers_file", "data/servers.json")?
            .set_default("data.alert_state_file", "data/alert_state.json")?
            .set_default("data.alert_config_file", "data/alert_config.json")?
            .set_default("slack.api_base", notifier::DEFAULT_SLACK_API_BASE)?
            .set_default("slack.timeout_secs", 10)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("metrics.enabled", true)?
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("INFRA").separator("__"))
            .set_override_option("slack.bot_token", std::env::var("SLACK_BOT_TOKEN").ok())?
            .set_override_option("slack.channel_id", std::env::var("SLACK_CHANNEL_ID").ok())?
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_file(dir.path().join("absent.toml")).unwrap();

        assert_eq!(settings.server.bind_address, "127.0.0.1:5000");
        assert_eq!(
            settings.data.alert_state_file,
            PathBuf::from("data/alert_state.json")
        );
        assert_eq!(settings.slack.timeout_secs, 10);
        assert_eq!(settings.logging.format, LogFormat::Pretty);
        assert!(settings.metrics.enabled);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("infra.toml");
        std::fs::write(
            &path,
            r#"
[server]
bind_address = "0.0.0.0:8080"

[data]
servers_file = "/srv/infra/servers.json"

[logging]
format = "json"
"#,
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.server.bind_address, "0.0.0.0:8080");
        assert_eq!(
            settings.data.servers_file,
            PathBuf::from("/srv/infra/servers.json")
        );
        assert_eq!(
            settings.data.alert_config_file,
            PathBuf::from("data/alert_config.json")
        );
        assert_eq!(settings.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_logging_level_must_be_known() {
        let mut logging = LoggingSettings {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
        };
        assert_eq!(logging.max_level().unwrap(), Level::DEBUG);

        logging.level = "verbose".to_string();
        assert!(logging.max_level().is_err());
    }

    #[test]
    fn test_slack_requires_token_and_channel() {
        let mut slack = SlackSettings {
            bot_token: Some("xoxb-1".to_string()),
            channel_id: None,
            api_base: "https://slack.com/api".to_string(),
            timeout_secs: 10,
        };
        assert!(slack.client_config().is_none());

        slack.channel_id = Some("  ".to_string());
        assert!(slack.client_config().is_none());

        slack.channel_id = Some("C0123".to_string());
        let config = slack.client_config().unwrap();
        assert_eq!(config.bot_token, "xoxb-1");
        assert_eq!(config.channel_id, "C0123");
    }
}
