use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use super::defaults;

/// Top-level configuration for the spamguard detection service.
/// Deserializes from a TOML configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "defaults::default_server_config")]
    pub server: ServerConfig,

    #[serde(default = "defaults::default_logging_config")]
    pub logging: LoggingConfig,

    #[serde(default = "defaults::default_cluster_config")]
    pub cluster: ClusterConfig,

    #[serde(default = "defaults::default_behavior_config")]
    pub behavior: BehaviorConfig,

    #[serde(default = "defaults::default_reporting_config")]
    pub reporting: ReportingConfig,
}

impl Settings {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: defaults::default_server_config(),
            logging: defaults::default_logging_config(),
            cluster: defaults::default_cluster_config(),
            behavior: defaults::default_behavior_config(),
            reporting: defaults::default_reporting_config(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::default_bind")]
    pub bind: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    pub level: String,

    /// Optional log file appended to in addition to stdout.
    #[serde(default)]
    pub file: Option<String>,

    /// `"text"` or `"json"`.
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

/// Thresholds for IP-based cluster detection and batch flagging.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    /// Minimum users sharing one IP before a cluster is emitted.
    #[serde(default = "defaults::default_min_cluster_size")]
    pub min_cluster_size: usize,

    /// Cluster sizes strictly above this are rated high risk.
    #[serde(default = "defaults::default_high_risk_size")]
    pub high_risk_size: usize,

    /// Batch lengths strictly above this flag the length-only endpoint rule.
    #[serde(default = "defaults::default_batch_flag_threshold")]
    pub batch_flag_threshold: usize,
}

/// Thresholds for per-user behavior scoring. Signal weights are fixed in
/// code; only the trip points are tunable.
#[derive(Debug, Clone, Deserialize)]
pub struct BehaviorConfig {
    #[serde(default = "defaults::default_concentration_threshold")]
    pub concentration_threshold: f64,

    #[serde(default = "defaults::default_volume_threshold")]
    pub volume_threshold: usize,

    #[serde(default = "defaults::default_single_ip_comment_threshold")]
    pub single_ip_comment_threshold: usize,

    #[serde(default = "defaults::default_high_risk_score")]
    pub high_risk_score: u32,

    #[serde(default = "defaults::default_medium_risk_score")]
    pub medium_risk_score: u32,

    #[serde(default = "defaults::default_similarity_threshold")]
    pub similarity_threshold: f64,

    #[serde(default = "defaults::default_rapid_comment_threshold")]
    pub rapid_comment_threshold: usize,
}

/// Periodic stats reporting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    #[serde(default = "defaults::default_report_interval_secs")]
    pub interval_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_scoring_constants() {
        let settings = Settings::default();
        assert_eq!(settings.server.bind, "0.0.0.0:5000");
        assert_eq!(settings.cluster.min_cluster_size, 2);
        assert_eq!(settings.cluster.high_risk_size, 3);
        assert_eq!(settings.cluster.batch_flag_threshold, 3);
        assert!((settings.behavior.concentration_threshold - 0.8).abs() < f64::EPSILON);
        assert_eq!(settings.behavior.volume_threshold, 20);
        assert_eq!(settings.behavior.single_ip_comment_threshold, 5);
        assert_eq!(settings.behavior.high_risk_score, 70);
        assert_eq!(settings.behavior.medium_risk_score, 40);
        assert!((settings.behavior.similarity_threshold - 0.7).abs() < f64::EPSILON);
        assert_eq!(settings.behavior.rapid_comment_threshold, 10);
    }

    #[test]
    fn test_load_partial_file_takes_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nbind = \"127.0.0.1:8080\"\n\n[cluster]\nhigh_risk_size = 5\n"
        )
        .unwrap();

        let settings = Settings::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(settings.server.bind, "127.0.0.1:8080");
        assert_eq!(settings.cluster.high_risk_size, 5);
        // Untouched sections and fields keep their defaults.
        assert_eq!(settings.cluster.min_cluster_size, 2);
        assert_eq!(settings.behavior.volume_threshold, 20);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.reporting.interval_secs, 60);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(Settings::load("/nonexistent/spamguard.toml").is_err());
    }

    #[test]
    fn test_load_invalid_toml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not toml at all [[[").unwrap();
        assert!(Settings::load(file.path().to_str().unwrap()).is_err());
    }
}
