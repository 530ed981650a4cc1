use std::fmt;

use serde::{Deserialize, Serialize};

/// Categorical risk bucket derived from a numeric score via fixed thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

impl RiskLevel {
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Medium and High both count as suspicious.
    pub fn is_suspicious(&self) -> bool {
        matches!(self, RiskLevel::Medium | RiskLevel::High)
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        Self::Low
    }
}
