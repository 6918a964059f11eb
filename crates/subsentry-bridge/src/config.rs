use serde::{Deserialize, Serialize};

/// Base URL used when neither the environment nor the config file names one.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Connection settings for the alerts service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root of the REST API, without the `/api/...` suffix.
    pub base_url: String,
    /// Upper bound for a single alerts request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 15,
        }
    }
}

/// Settings for the periodic alerts refresh.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Period between two scheduled fetch cycles, in seconds.
    pub interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}

/// Decides which completion wins when fetch cycles overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrdering {
    /// Only the most recently issued request may update the alert set.
    /// Older responses arriving late are dropped. Default value.
    #[default]
    LatestIssued,
    /// Whatever finishes last overwrites the set, even if it was issued
    /// earlier.
    LastCompleted,
}

/// How alerts are presented in the header dropdown.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// A renewal this many days away (or fewer, but not overdue) is urgent.
    pub urgent_within_days: i64,
    /// Maximum number of rows shown in the dropdown. The badge still counts
    /// the full set.
    pub max_visible: usize,
    pub result_ordering: ResultOrdering,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            urgent_within_days: 3,
            max_visible: 6,
            result_ordering: ResultOrdering::default(),
        }
    }
}

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub alerts: AlertsConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.polling.interval_secs, 60);
        assert_eq!(config.alerts.max_visible, 6);
        assert_eq!(config.alerts.result_ordering, ResultOrdering::LatestIssued);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let toml_str = r#"
[api]
base_url = "https://api.subsentry.app"

[alerts]
result_ordering = "last_completed"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://api.subsentry.app");
        assert_eq!(config.api.request_timeout_secs, 15);
        assert_eq!(config.polling.interval_secs, 60);
        assert_eq!(config.alerts.urgent_within_days, 3);
        assert_eq!(config.alerts.result_ordering, ResultOrdering::LastCompleted);
    }

    #[test]
    fn test_config_toml_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("interval_secs = 60"));
        assert!(toml_str.contains("result_ordering = \"latest_issued\""));
    }
}
