use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::settings::ClusterConfig;
use crate::models::activity::{Cluster, UserRecord};
use crate::models::risk::RiskLevel;

/// Sentinel key for records that carry no usable IP.
const UNKNOWN_IP: &str = "unknown";

/// Assessment of a flat identifier batch by the length-only rule. This rule
/// is independent of IP-based grouping and the two are intentionally not
/// reconciled: the batch endpoint receives no IP data to group on.
#[derive(Debug, Clone)]
pub struct BatchAssessment {
    pub cluster_id: Option<u64>,
    pub size: usize,
    pub risk_level: RiskLevel,
    pub description: String,
}

/// Groups users by declared IP address and emits a cluster record for every
/// IP shared by enough accounts. Stateless; every call stands alone.
pub struct ClusterDetector {
    min_cluster_size: usize,
    high_risk_size: usize,
    batch_flag_threshold: usize,
}

impl ClusterDetector {
    pub fn new(config: &ClusterConfig) -> Self {
        Self {
            min_cluster_size: config.min_cluster_size,
            high_risk_size: config.high_risk_size,
            batch_flag_threshold: config.batch_flag_threshold,
        }
    }

    /// Partition users by exact IP equality and emit a [`Cluster`] for every
    /// group of at least `min_cluster_size` members. Clusters come out in
    /// first-seen IP order; member lists preserve encounter order.
    pub fn detect(&self, users: &[UserRecord]) -> Vec<Cluster> {
        let mut groups: IndexMap<&str, Vec<&str>> = IndexMap::new();

        for user in users {
            let ip = if user.ip.is_empty() {
                UNKNOWN_IP
            } else {
                user.ip.as_str()
            };
            groups.entry(ip).or_default().push(user.user_id.as_str());
        }

        let clusters: Vec<Cluster> = groups
            .into_iter()
            .filter(|(_, members)| members.len() >= self.min_cluster_size)
            .map(|(ip, members)| Cluster {
                cluster_id: cluster_id_for_key(ip),
                users: members.iter().map(|id| id.to_string()).collect(),
                common_ip: ip.to_string(),
                size: members.len(),
                risk_level: if members.len() > self.high_risk_size {
                    RiskLevel::High
                } else {
                    RiskLevel::Medium
                },
            })
            .collect();

        debug!(
            users = users.len(),
            clusters = clusters.len(),
            "Cluster detection completed"
        );

        clusters
    }

    /// Length-only batch rule used by the cluster endpoint: a flat identifier
    /// list with more than `batch_flag_threshold` entries is flagged high
    /// risk with a generated cluster id; anything smaller is low risk.
    pub fn flag_batch(&self, users: &[String]) -> BatchAssessment {
        let size = users.len();

        if size > self.batch_flag_threshold {
            BatchAssessment {
                cluster_id: Some(cluster_id_for_key(&users.join(","))),
                size,
                risk_level: RiskLevel::High,
                description: "Suspected spam cluster detected".to_string(),
            }
        } else {
            BatchAssessment {
                cluster_id: None,
                size,
                risk_level: RiskLevel::Low,
                description: "No obvious spam cluster traits".to_string(),
            }
        }
    }
}

/// Deterministic display identifier for a cluster key: first 8 bytes of
/// SHA-256, big-endian, mod 1000. Unique per distinct key is desired but
/// collisions are tolerated; this is not a stable lookup key.
pub fn cluster_id_for_key(key: &str) -> u64 {
    let digest = Sha256::digest(key.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix) % 1000
}
