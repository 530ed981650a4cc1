use super::settings::{
    BehaviorConfig, ClusterConfig, LoggingConfig, ReportingConfig, ServerConfig,
};

// ---------------------------------------------------------------------------
// Top-level struct defaults
// ---------------------------------------------------------------------------

pub fn default_server_config() -> ServerConfig {
    ServerConfig {
        bind: default_bind(),
    }
}

pub fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        file: None,
        format: default_log_format(),
    }
}

pub fn default_cluster_config() -> ClusterConfig {
    ClusterConfig {
        min_cluster_size: default_min_cluster_size(),
        high_risk_size: default_high_risk_size(),
        batch_flag_threshold: default_batch_flag_threshold(),
    }
}

pub fn default_behavior_config() -> BehaviorConfig {
    BehaviorConfig {
        concentration_threshold: default_concentration_threshold(),
        volume_threshold: default_volume_threshold(),
        single_ip_comment_threshold: default_single_ip_comment_threshold(),
        high_risk_score: default_high_risk_score(),
        medium_risk_score: default_medium_risk_score(),
        similarity_threshold: default_similarity_threshold(),
        rapid_comment_threshold: default_rapid_comment_threshold(),
    }
}

pub fn default_reporting_config() -> ReportingConfig {
    ReportingConfig {
        interval_secs: default_report_interval_secs(),
    }
}

// ---------------------------------------------------------------------------
// ServerConfig field defaults
// ---------------------------------------------------------------------------

pub fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

// ---------------------------------------------------------------------------
// LoggingConfig field defaults
// ---------------------------------------------------------------------------

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "text".to_string()
}

// ---------------------------------------------------------------------------
// ClusterConfig field defaults
// ---------------------------------------------------------------------------

pub fn default_min_cluster_size() -> usize {
    2
}

pub fn default_high_risk_size() -> usize {
    3
}

pub fn default_batch_flag_threshold() -> usize {
    3
}

// ---------------------------------------------------------------------------
// BehaviorConfig field defaults
// ---------------------------------------------------------------------------

pub fn default_concentration_threshold() -> f64 {
    0.8
}

pub fn default_volume_threshold() -> usize {
    20
}

pub fn default_single_ip_comment_threshold() -> usize {
    5
}

pub fn default_high_risk_score() -> u32 {
    70
}

pub fn default_medium_risk_score() -> u32 {
    40
}

pub fn default_similarity_threshold() -> f64 {
    0.7
}

pub fn default_rapid_comment_threshold() -> usize {
    10
}

// ---------------------------------------------------------------------------
// ReportingConfig field defaults
// ---------------------------------------------------------------------------

pub fn default_report_interval_secs() -> u64 {
    60
}
