//! Configuration for the checkpoint wait service.

use crate::core::{AggregatorSettings, DEFAULT_RECENT_LIMIT, MIN_COMMUNITY_REPORTS};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to
    pub host: String,

    /// Port the HTTP server listens on
    pub port: u16,

    /// IANA timezone used for the estimator's local hour and weekday
    pub timezone: String,

    /// Length of the trailing report window
    #[serde(with = "duration_serde")]
    pub window: Duration,

    /// Reports returned by a recent-reports lookup
    pub recent_report_limit: usize,

    /// Reports needed before the community average stands alone
    pub min_community_reports: usize,

    /// Load the sample airports and reports into an empty store
    pub seed_on_start: bool,

    /// Keep reports and activity counters on disk between runs
    pub persist_reports: bool,

    /// Path for stored reports and activity stats
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("checkpoint-wait");

        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            timezone: "America/New_York".to_string(),
            window: Duration::from_secs(24 * 60 * 60),
            recent_report_limit: DEFAULT_RECENT_LIMIT,
            min_community_reports: MIN_COMMUNITY_REPORTS,
            seed_on_start: true,
            persist_reports: false,
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::Io(e.to_string()))?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from JSON. Missing fields take their defaults.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("checkpoint-wait")
            .join("config.json")
    }

    /// File holding persisted airports and reports.
    pub fn store_path(&self) -> PathBuf {
        self.data_path.join("reports.json")
    }

    /// File holding persisted activity counters.
    pub fn activity_path(&self) -> PathBuf {
        self.data_path.join("activity.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Resolve the configured timezone name.
    pub fn parse_timezone(&self) -> Result<Tz, ConfigError> {
        parse_timezone(&self.timezone)
    }

    /// Aggregation tunables derived from this configuration.
    pub fn aggregator_settings(&self) -> Result<AggregatorSettings, ConfigError> {
        if self.window.is_zero() {
            return Err(ConfigError::Invalid("window must be longer than zero".to_string()));
        }
        let window = chrono::Duration::from_std(self.window)
            .map_err(|e| ConfigError::Invalid(format!("window: {e}")))?;

        Ok(AggregatorSettings {
            window,
            min_community_reports: self.min_community_reports,
            recent_limit: self.recent_report_limit,
        })
    }
}

/// Resolve an IANA timezone name such as `America/Chicago`.
pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::UnknownTimezone(name.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.window, Duration::from_secs(86_400));
        assert_eq!(config.min_community_reports, 3);
        assert_eq!(config.recent_report_limit, 50);
        assert!(config.seed_on_start);
        assert_eq!(
            config.parse_timezone().unwrap(),
            chrono_tz::America::New_York
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json(r#"{"port": 8080, "timezone": "America/Chicago"}"#).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.parse_timezone().unwrap(), chrono_tz::America::Chicago);
    }

    #[test]
    fn test_window_serialized_as_seconds() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["window"], 86_400);

        let config = Config::from_json(r#"{"window": 7200}"#).unwrap();
        let settings = config.aggregator_settings().unwrap();
        assert_eq!(settings.window, chrono::Duration::hours(2));
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            parse_timezone("Mars/Olympus_Mons"),
            Err(ConfigError::UnknownTimezone(_))
        ));

        let config = Config::from_json(r#"{"window": 0}"#).unwrap();
        assert!(matches!(
            config.aggregator_settings(),
            Err(ConfigError::Invalid(_))
        ));

        assert!(matches!(
            Config::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_data_files_live_under_data_path() {
        let config = Config {
            data_path: PathBuf::from("/tmp/cw"),
            ..Config::default()
        };
        assert_eq!(config.store_path(), PathBuf::from("/tmp/cw/reports.json"));
        assert_eq!(config.activity_path(), PathBuf::from("/tmp/cw/activity.json"));
    }
}
