//! Dashboard configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. `TRADELENS_API_BASE` overrides `api.base_url`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Trade;

/// Environment variable that overrides the backend base URL.
pub const API_BASE_ENV: &str = "TRADELENS_API_BASE";

/// Widest cumulative chart the plain-text renderer will draw.
pub const MAX_CHART_WIDTH: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    pub chart: ChartConfig,
    pub report: ReportConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            timeout_secs: 30,
            max_retries: 3,
            base_delay_ms: 500,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

/// Cumulative-profit chart dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Number of row steps; the chart draws `height + 1` value rows.
    pub height: usize,
    /// Maximum number of trades (columns) plotted.
    pub max_width: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            height: 10,
            max_width: MAX_CHART_WIDTH,
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub file_name: String,
    pub ordering: TradeOrdering,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("reports"),
            file_name: "strategy_report.md".into(),
            ordering: TradeOrdering::AsReceived,
        }
    }
}

/// How trades are ordered before they reach the aggregator.
///
/// The aggregator never reorders; durations and the cumulative series follow
/// whatever order it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeOrdering {
    /// Keep the backend's order.
    #[default]
    AsReceived,
    /// Stable sort by timestamp.
    Chronological,
}

impl TradeOrdering {
    pub fn apply(self, mut trades: Vec<Trade>) -> Vec<Trade> {
        if self == TradeOrdering::Chronological {
            trades.sort_by_key(|t| t.time);
        }
        trades
    }
}

impl DashboardConfig {
    /// Load from a TOML file and apply the environment override.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML string. No environment override.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus the environment override.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                tracing::debug!(base_url = %base, "backend URL overridden from environment");
                self.api.base_url = base;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must start with http:// or https:// (got '{base}')"
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be > 0".into()));
        }
        if self.chart.height == 0 {
            return Err(ConfigError::Invalid("chart.height must be > 0".into()));
        }
        if self.chart.max_width == 0 || self.chart.max_width > MAX_CHART_WIDTH {
            return Err(ConfigError::Invalid(format!(
                "chart.max_width must be between 1 and {MAX_CHART_WIDTH}"
            )));
        }
        if self.report.file_name.trim().is_empty() {
            return Err(ConfigError::Invalid("report.file_name must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;
    use chrono::{TimeZone, Utc};

    #[test]
    fn empty_toml_gives_defaults() {
        let config = DashboardConfig::from_toml("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.chart.height, 10);
        assert_eq!(config.chart.max_width, 50);
        assert_eq!(config.report.file_name, "strategy_report.md");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = DashboardConfig::from_toml(
            r#"
[api]
base_url = "http://10.0.0.5:8080"

[chart]
height = 6

[report]
ordering = "chronological"
"#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.5:8080");
        assert_eq!(config.api.max_retries, 3);
        assert_eq!(config.chart.height, 6);
        assert_eq!(config.chart.max_width, 50);
        assert_eq!(config.report.ordering, TradeOrdering::Chronological);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(matches!(
            DashboardConfig::from_toml("[chart]\nmax_width = 80"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DashboardConfig::from_toml("[chart]\nheight = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DashboardConfig::from_toml("[api]\nbase_url = \"localhost\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DashboardConfig::from_toml("[chart\nheight = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = DashboardConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn chronological_ordering_is_stable() {
        let at = |h: u32, ticket: i64| Trade {
            ticket,
            symbol: "EURUSD".into(),
            direction: Direction::Buy,
            volume: 0.1,
            price_open: 1.1,
            profit: 1.0,
            time: Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap(),
        };
        let trades = vec![at(5, 1), at(3, 2), at(5, 3), at(1, 4)];

        let kept = TradeOrdering::AsReceived.apply(trades.clone());
        let kept: Vec<i64> = kept.iter().map(|t| t.ticket).collect();
        assert_eq!(kept, vec![1, 2, 3, 4]);

        let sorted = TradeOrdering::Chronological.apply(trades);
        let sorted: Vec<i64> = sorted.iter().map(|t| t.ticket).collect();
        assert_eq!(sorted, vec![4, 2, 1, 3]);
    }
}
