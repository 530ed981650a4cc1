use serde::{Deserialize, Serialize};

use crate::models::risk::RiskLevel;

/// One user as seen in a cluster-detection batch. Absent fields degrade to
/// sentinels rather than failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub user_id: String,

    #[serde(default = "default_ip")]
    pub ip: String,

    #[serde(default)]
    pub comment_count: u64,
}

fn default_ip() -> String {
    "unknown".to_string()
}

/// A group of two or more accounts sharing one IP within a single batch.
/// Derived on every request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub cluster_id: u64,
    pub users: Vec<String>,
    pub common_ip: String,
    pub size: usize,
    pub risk_level: RiskLevel,
}

/// A single user's observed activity: what they wrote and where from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserActivity {
    #[serde(default = "default_user_id")]
    pub user_id: String,

    #[serde(default)]
    pub comments: Vec<String>,

    #[serde(default)]
    pub ips: Vec<String>,
}

fn default_user_id() -> String {
    "unknown".to_string()
}

/// Full per-user risk assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorReport {
    pub user_id: String,
    pub comment_count: usize,
    pub unique_ips: usize,
    /// Fraction of IP occurrences attributable to the single most frequent
    /// IP, rounded to 3 decimal places. Zero for an empty IP list.
    pub ip_concentration: f64,
    /// Clamped to [0, 100].
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub is_suspicious: bool,
}

/// Result of the quick-check scoring variant. Deliberately not unified with
/// [`BehaviorReport`]: the two rules disagree at the margins and both are
/// part of the request surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorSummary {
    pub user_id: String,
    pub comment_count: usize,
    pub ip_variety: usize,
    /// `1 - unique/total`, rounded to 2 decimal places for display.
    pub ip_similarity: f64,
    pub is_suspicious: bool,
    /// `min(similarity * 100, 100)`, rounded to 1 decimal place.
    pub risk_score: f64,
}
