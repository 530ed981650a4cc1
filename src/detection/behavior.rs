use std::collections::HashMap;

use tracing::debug;

use crate::config::settings::BehaviorConfig;
use crate::models::activity::{BehaviorReport, BehaviorSummary, UserActivity};
use crate::models::risk::RiskLevel;

// Signal weights. The trip points are configurable; the weights are part of
// the scoring contract and stay fixed.
const CONCENTRATION_WEIGHT: u32 = 30;
const VOLUME_WEIGHT: u32 = 40;
const SINGLE_IP_WEIGHT: u32 = 30;

const MAX_SCORE: u32 = 100;

pub const FACTOR_HIGH_IP_CONCENTRATION: &str = "high_ip_concentration";
pub const FACTOR_ABNORMAL_COMMENT_VOLUME: &str = "abnormal_comment_volume";
pub const FACTOR_SINGLE_IP_HIGH_ACTIVITY: &str = "single_ip_high_activity";

/// Scores a single user's activity from IP concentration and comment volume.
///
/// Two scoring rules live here. [`analyze`](Self::analyze) is the full
/// additive model with named risk factors; [`quick_scan`](Self::quick_scan)
/// is a simpler similarity rule served by the behavior endpoint. They
/// disagree at the margins and are kept as distinct computations.
pub struct BehaviorAnalyzer {
    config: BehaviorConfig,
}

impl BehaviorAnalyzer {
    pub fn new(config: &BehaviorConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Full per-user assessment: additive 30/40/30 signal weights, score
    /// clamped to 100, level from fixed thresholds.
    pub fn analyze(&self, activity: &UserActivity) -> BehaviorReport {
        let comment_count = activity.comments.len();

        let mut ip_counts: HashMap<&str, usize> = HashMap::new();
        for ip in &activity.ips {
            *ip_counts.entry(ip.as_str()).or_insert(0) += 1;
        }
        let unique_ips = ip_counts.len();

        let ip_concentration = if activity.ips.is_empty() {
            0.0
        } else {
            let max_frequency = ip_counts.values().copied().max().unwrap_or(0);
            round_to(max_frequency as f64 / activity.ips.len() as f64, 3)
        };

        let mut risk_score: u32 = 0;
        let mut risk_factors: Vec<String> = Vec::new();

        if ip_concentration > self.config.concentration_threshold {
            risk_score += CONCENTRATION_WEIGHT;
            risk_factors.push(FACTOR_HIGH_IP_CONCENTRATION.to_string());
        }
        if comment_count > self.config.volume_threshold {
            risk_score += VOLUME_WEIGHT;
            risk_factors.push(FACTOR_ABNORMAL_COMMENT_VOLUME.to_string());
        }
        if unique_ips == 1 && comment_count > self.config.single_ip_comment_threshold {
            risk_score += SINGLE_IP_WEIGHT;
            risk_factors.push(FACTOR_SINGLE_IP_HIGH_ACTIVITY.to_string());
        }

        let risk_score = risk_score.min(MAX_SCORE);

        let risk_level = if risk_score >= self.config.high_risk_score {
            RiskLevel::High
        } else if risk_score >= self.config.medium_risk_score {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        debug!(
            user_id = %activity.user_id,
            score = risk_score,
            level = %risk_level,
            factors = ?risk_factors,
            "Behavior analysis completed"
        );

        BehaviorReport {
            user_id: activity.user_id.clone(),
            comment_count,
            unique_ips,
            ip_concentration,
            risk_score,
            risk_level,
            risk_factors,
            is_suspicious: risk_level.is_suspicious(),
        }
    }

    /// Quick-check rule: suspicion from IP similarity or raw comment volume.
    /// Suspicion compares the unrounded similarity; the reported fields carry
    /// display rounding (2 dp similarity, 1 dp score).
    pub fn quick_scan(&self, activity: &UserActivity) -> BehaviorSummary {
        let comment_count = activity.comments.len();

        let mut distinct: Vec<&str> = activity.ips.iter().map(String::as_str).collect();
        distinct.sort_unstable();
        distinct.dedup();
        let ip_variety = distinct.len();

        let total = activity.ips.len().max(1);
        let ip_similarity = 1.0 - ip_variety as f64 / total as f64;

        let is_suspicious = ip_similarity > self.config.similarity_threshold
            || comment_count > self.config.rapid_comment_threshold;

        BehaviorSummary {
            user_id: activity.user_id.clone(),
            comment_count,
            ip_variety,
            ip_similarity: round_to(ip_similarity, 2),
            is_suspicious,
            risk_score: round_to((ip_similarity * 100.0).min(100.0), 1),
        }
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults;

    fn analyzer() -> BehaviorAnalyzer {
        BehaviorAnalyzer::new(&defaults::default_behavior_config())
    }

    fn activity(user_id: &str, comments: Vec<&str>, ips: Vec<&str>) -> UserActivity {
        UserActivity {
            user_id: user_id.to_string(),
            comments: comments.into_iter().map(String::from).collect(),
            ips: ips.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_single_ip_repeat_commenter() {
        // 15 comments from one IP: concentration and single-IP signals fire,
        // volume (> 20) does not. 30 + 30 = 60.
        let report = analyzer().analyze(&activity("u1", vec!["x"; 15], vec!["1.1.1.1"; 15]));

        assert_eq!(report.comment_count, 15);
        assert_eq!(report.unique_ips, 1);
        assert!((report.ip_concentration - 1.0).abs() < f64::EPSILON);
        assert_eq!(report.risk_score, 60);
        assert_eq!(report.risk_level, RiskLevel::Medium);
        assert!(report.is_suspicious);
        assert_eq!(
            report.risk_factors,
            vec![FACTOR_HIGH_IP_CONCENTRATION, FACTOR_SINGLE_IP_HIGH_ACTIVITY]
        );
    }

    #[test]
    fn test_all_three_weights_sum_to_cap() {
        // 25 comments from one IP trips every signal: 30 + 40 + 30, clamped.
        let report = analyzer().analyze(&activity("u1", vec!["x"; 25], vec!["9.9.9.9"; 25]));
        assert_eq!(report.risk_score, 100);
        assert_eq!(report.risk_level, RiskLevel::High);
        assert_eq!(report.risk_factors.len(), 3);
    }

    #[test]
    fn test_normal_user_is_low_risk() {
        let report = analyzer().analyze(&activity(
            "user_normal",
            vec!["nice", "good"],
            vec!["192.168.1.1", "192.168.1.2"],
        ));

        assert_eq!(report.risk_score, 0);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert!(!report.is_suspicious);
        assert!(report.risk_factors.is_empty());
    }

    #[test]
    fn test_empty_input_is_valid_and_low() {
        let report = analyzer().analyze(&UserActivity::default());

        assert_eq!(report.comment_count, 0);
        assert_eq!(report.unique_ips, 0);
        assert_eq!(report.ip_concentration, 0.0);
        assert_eq!(report.risk_score, 0);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert!(!report.is_suspicious);
    }

    #[test]
    fn test_volume_alone_is_medium() {
        // 21 comments from many distinct IPs: only the volume signal fires.
        let ips: Vec<String> = (0..21).map(|i| format!("10.0.0.{i}")).collect();
        let act = UserActivity {
            user_id: "u2".to_string(),
            comments: vec!["x".to_string(); 21],
            ips,
        };

        let report = analyzer().analyze(&act);
        assert_eq!(report.risk_score, 40);
        assert_eq!(report.risk_level, RiskLevel::Medium);
        assert!(report.is_suspicious);
        assert_eq!(report.risk_factors, vec![FACTOR_ABNORMAL_COMMENT_VOLUME]);
    }

    #[test]
    fn test_concentration_rounds_to_three_places() {
        // 2 of 3 occurrences on one IP: 0.666666... -> 0.667.
        let report = analyzer().analyze(&activity(
            "u3",
            vec![],
            vec!["1.1.1.1", "1.1.1.1", "2.2.2.2"],
        ));
        assert!((report.ip_concentration - 0.667).abs() < 1e-9);
    }

    #[test]
    fn test_suspicious_iff_level_at_least_medium() {
        let cases = [
            activity("a", vec![], vec![]),
            activity("b", vec!["x"; 6], vec!["1.1.1.1"; 6]),
            activity("c", vec!["x"; 30], vec!["1.1.1.1"; 30]),
        ];
        for case in &cases {
            let report = analyzer().analyze(case);
            assert_eq!(report.is_suspicious, report.risk_level.is_suspicious());
            assert!(report.risk_score <= 100);
        }
    }

    #[test]
    fn test_quick_scan_half_similarity_not_suspicious() {
        let summary = analyzer().quick_scan(&activity("u1", vec![], vec!["1.1.1.1", "1.1.1.1"]));

        assert_eq!(summary.ip_variety, 1);
        assert!((summary.ip_similarity - 0.5).abs() < f64::EPSILON);
        assert!(!summary.is_suspicious);
        assert!((summary.risk_score - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quick_scan_high_similarity_is_suspicious() {
        let summary = analyzer().quick_scan(&activity("u1", vec![], vec!["1.1.1.1"; 10]));

        assert_eq!(summary.ip_variety, 1);
        assert!((summary.ip_similarity - 0.9).abs() < f64::EPSILON);
        assert!(summary.is_suspicious);
        assert!((summary.risk_score - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quick_scan_comment_volume_alone_is_suspicious() {
        let summary = analyzer().quick_scan(&activity("u1", vec!["x"; 11], vec![]));

        assert_eq!(summary.comment_count, 11);
        assert_eq!(summary.ip_variety, 0);
        assert!(summary.is_suspicious);
    }

    #[test]
    fn test_quick_scan_empty_input() {
        // Empty IP list divides by the floor of 1: similarity 1 - 0/1 = 1.0,
        // which exceeds the 0.7 threshold.
        let summary = analyzer().quick_scan(&UserActivity::default());
        assert!((summary.ip_similarity - 1.0).abs() < f64::EPSILON);
        assert!(summary.is_suspicious);
        assert!((summary.risk_score - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_variants_disagree_at_the_margins() {
        // Two comments from one IP: quick_scan sees 0.5 similarity (clean)
        // while the full model sees perfect concentration but too few
        // comments for any signal. Both land non-suspicious here, but the
        // inputs that flip each differ; spot-check one divergent case.
        let act = activity("u1", vec!["x"; 6], vec!["1.1.1.1"; 2]);
        let report = analyzer().analyze(&act);
        let summary = analyzer().quick_scan(&act);
        assert!(report.is_suspicious); // concentration 1.0 + single IP > 5 comments
        assert!(!summary.is_suspicious); // similarity 0.5, 6 comments <= 10
    }
}
