use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::analytics::collector::StatsCollector;
use crate::config::settings::Settings;

/// Periodic reporter that logs the accumulated service counters.
pub struct StatsReporter {
    collector: Arc<StatsCollector>,
    interval_secs: u64,

    // Requests seen at the previous report, for per-interval deltas.
    last_requests: Mutex<u64>,
}

impl StatsReporter {
    pub fn new(collector: Arc<StatsCollector>, settings: &Settings) -> Self {
        Self {
            collector,
            interval_secs: settings.reporting.interval_secs.max(1),
            last_requests: Mutex::new(0),
        }
    }

    /// Run the reporter loop forever.
    pub async fn run(&self) {
        let mut report_interval = interval(Duration::from_secs(self.interval_secs));
        report_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // The first tick fires immediately; skip it so the first report
        // covers a full interval.
        report_interval.tick().await;

        loop {
            report_interval.tick().await;
            self.report();
        }
    }

    fn report(&self) {
        let snapshot = self.collector.get_snapshot();

        let mut last = self.last_requests.lock();
        let delta = snapshot.requests_served.saturating_sub(*last);
        *last = snapshot.requests_served;

        info!(
            requests = snapshot.requests_served,
            requests_interval = delta,
            cluster_checks = snapshot.cluster_checks,
            batches_flagged = snapshot.batches_flagged,
            behavior_scans = snapshot.behavior_scans,
            users_flagged = snapshot.users_flagged,
            unique_users = snapshot.unique_users,
            parse_failures = snapshot.parse_failures,
            uptime_secs = snapshot.uptime_secs,
            "Service stats"
        );
    }
}
