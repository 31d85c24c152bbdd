//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::errors::ConfigError;

/// Job-trigger period used when the config does not set one, in seconds.
pub const DEFAULT_JOB_TRIGGER_PERIOD: u64 = 5;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub transport: TransportConfig,

    /// Ordered plugin package names. Empty means the built-in default
    /// package.
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Seconds between scheduled-job trigger checks
    #[serde(default = "default_job_trigger_period")]
    pub job_trigger_period: u64,

    /// Reply sent when no plugin handled a respond-to event
    #[serde(default)]
    pub default_reply: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransportConfig {
    /// Chat server API version; only 4+ is supported
    pub api_version: u32,
    pub url: String,
    pub team: String,
    pub login: String,
    pub password: Option<String>,
    pub token: Option<String>,
    #[serde(default = "default_true")]
    pub ssl_verify: bool,
}

fn default_job_trigger_period() -> u64 {
    DEFAULT_JOB_TRIGGER_PERIOD
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "relay-bot".to_string(),
            },
            transport: TransportConfig {
                api_version: 4,
                url: "http://chat.example.com/api/v4".to_string(),
                team: "devops".to_string(),
                login: "bot@example.com".to_string(),
                password: None,
                token: None,
                ssl_verify: true,
            },
            plugins: Vec::new(),
            job_trigger_period: DEFAULT_JOB_TRIGGER_PERIOD,
            default_reply: None,
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Defaults overridden from environment variables
    pub fn load_env() -> Self {
        let mut config = Config::default();

        if let Ok(url) = std::env::var("BOT_URL") {
            config.transport.url = url;
        }
        if let Ok(token) = std::env::var("BOT_TOKEN") {
            config.transport.token = Some(token);
        }
        if let Ok(plugins) = std::env::var("BOT_PLUGINS") {
            config.plugins = plugins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(period) = std::env::var("JOB_TRIGGER_PERIOD") {
            if let Ok(period) = period.parse() {
                config.job_trigger_period = period;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.transport.api_version, 4);
        assert_eq!(config.job_trigger_period, 5);
        assert!(config.plugins.is_empty());
        assert!(config.default_reply.is_none());
    }

    #[test]
    fn parses_kebab_case_yaml() {
        let yaml = r#"
bot:
  name: testbot
transport:
  api-version: 4
  url: http://localhost/api/v4
  team: qa
  login: bot@test
plugins:
  - builtin
  - extra.pack
job-trigger-period: 2
default-reply: "sorry, no idea"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.bot.name, "testbot");
        assert_eq!(config.plugins, vec!["builtin", "extra.pack"]);
        assert_eq!(config.job_trigger_period, 2);
        assert_eq!(config.default_reply.as_deref(), Some("sorry, no idea"));
        assert!(config.transport.ssl_verify);
    }

    #[test]
    fn default_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.bot.name, "relay-bot");
        assert_eq!(parsed.job_trigger_period, DEFAULT_JOB_TRIGGER_PERIOD);
    }
}
