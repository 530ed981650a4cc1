//! Heuristic spam-cluster detection service.
//!
//! Accepts batches of user identifiers, comment text, and IP addresses over
//! a small HTTP/JSON API and returns bounded risk scores intended to flag
//! coordinated fake-account activity.
//!
//! The two detection cores are stateless pure functions:
//!
//! - [`detection::cluster::ClusterDetector`] groups users by shared IP and
//!   emits a cluster record for every IP shared by two or more accounts.
//! - [`detection::behavior::BehaviorAnalyzer`] scores a single user's
//!   activity from IP concentration and comment volume.
//!
//! Everything else (routing, JSON envelopes, counters) is glue around them.

pub mod analytics;
pub mod api;
pub mod config;
pub mod detection;
pub mod models;

pub use config::settings::Settings;
pub use detection::behavior::BehaviorAnalyzer;
pub use detection::cluster::ClusterDetector;
pub use models::activity::{BehaviorReport, BehaviorSummary, Cluster, UserActivity, UserRecord};
pub use models::risk::RiskLevel;
