use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Point-in-time view of the service counters.
#[derive(Clone, Debug)]
pub struct StatsSnapshot {
    pub requests_served: u64,
    pub parse_failures: u64,
    pub cluster_checks: u64,
    pub batches_flagged: u64,
    pub behavior_scans: u64,
    pub users_flagged: u64,
    pub unique_users: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
}

/// Monotonic in-process counters recorded by the HTTP handlers. The only
/// state shared across requests; everything else in the service is stateless.
pub struct StatsCollector {
    requests_served: AtomicU64,
    parse_failures: AtomicU64,
    cluster_checks: AtomicU64,
    batches_flagged: AtomicU64,
    behavior_scans: AtomicU64,
    users_flagged: AtomicU64,

    seen_users: DashMap<String, ()>,

    started_at: DateTime<Utc>,
    start_time: Instant,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            requests_served: AtomicU64::new(0),
            parse_failures: AtomicU64::new(0),
            cluster_checks: AtomicU64::new(0),
            batches_flagged: AtomicU64::new(0),
            behavior_scans: AtomicU64::new(0),
            users_flagged: AtomicU64::new(0),
            seen_users: DashMap::new(),
            started_at: Utc::now(),
            start_time: Instant::now(),
        }
    }

    pub fn record_request(&self) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cluster_check(&self, flagged: bool) {
        self.cluster_checks.fetch_add(1, Ordering::Relaxed);
        if flagged {
            self.batches_flagged.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_behavior_scan(&self, user_id: &str, suspicious: bool) {
        self.behavior_scans.fetch_add(1, Ordering::Relaxed);
        if suspicious {
            self.users_flagged.fetch_add(1, Ordering::Relaxed);
        }
        self.seen_users.entry(user_id.to_string()).or_insert(());
    }

    pub fn get_snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests_served: self.requests_served.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            cluster_checks: self.cluster_checks.load(Ordering::Relaxed),
            batches_flagged: self.batches_flagged.load(Ordering::Relaxed),
            behavior_scans: self.behavior_scans.load(Ordering::Relaxed),
            users_flagged: self.users_flagged.load(Ordering::Relaxed),
            unique_users: self.seen_users.len() as u64,
            started_at: self.started_at,
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}
