use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::analytics::collector::StatsCollector;
use crate::config::settings::Settings;
use crate::detection::behavior::BehaviorAnalyzer;
use crate::detection::cluster::ClusterDetector;
use crate::models::activity::UserActivity;

pub const SERVICE_NAME: &str = "spamguard";

/// Shared handler state. The detectors are stateless; the collector holds
/// the only cross-request counters.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub cluster: Arc<ClusterDetector>,
    pub behavior: Arc<BehaviorAnalyzer>,
    pub stats: Arc<StatsCollector>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, stats: Arc<StatsCollector>) -> Self {
        Self {
            cluster: Arc::new(ClusterDetector::new(&settings.cluster)),
            behavior: Arc::new(BehaviorAnalyzer::new(&settings.behavior)),
            settings,
            stats,
            start_time: Instant::now(),
        }
    }
}

/// The single failure tier: anything that goes wrong while processing a
/// request becomes a 500 with the message in the error envelope.
pub struct ApiError(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": self.0,
            })),
        )
            .into_response()
    }
}

fn success(data: Value) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": data,
    }))
}

#[derive(Debug, Deserialize)]
struct DetectClusterRequest {
    #[serde(default)]
    users: Vec<String>,
}

/// `GET /` - plain HTML index describing the service.
pub async fn home(State(state): State<AppState>) -> Html<&'static str> {
    state.stats.record_request();
    Html(
        "<h1>Spam Cluster Detection Service</h1>\
         <p>API service running.</p>\
         <p>Available endpoints:</p>\
         <ul>\
         <li>GET /health - health check</li>\
         <li>POST /api/detect_cluster - cluster detection</li>\
         <li>POST /api/analyze_behavior - behavior analysis</li>\
         <li>GET /api/test - test endpoint</li>\
         </ul>",
    )
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    state.stats.record_request();
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
    }))
}

/// `GET /api/test`
pub async fn test_api(State(state): State<AppState>) -> Json<Value> {
    state.stats.record_request();
    Json(json!({
        "message": "API running normally",
        "endpoints": [
            "/api/detect_cluster",
            "/api/analyze_behavior",
        ],
    }))
}

/// `POST /api/detect_cluster` - length-only batch rule over a flat list of
/// user identifiers. Missing fields default to empty; a malformed body is
/// the one failure mode and maps to the 500 envelope.
pub async fn detect_cluster(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    state.stats.record_request();

    let request: DetectClusterRequest = parse_body(&state, &body)?;
    let assessment = state.cluster.flag_batch(&request.users);
    state
        .stats
        .record_cluster_check(assessment.cluster_id.is_some());

    debug!(
        size = assessment.size,
        risk_level = %assessment.risk_level,
        "Cluster check completed"
    );

    Ok(success(json!({
        "cluster_id": assessment.cluster_id,
        "users": request.users,
        "size": assessment.size,
        "risk_level": assessment.risk_level,
        "description": assessment.description,
    })))
}

/// `POST /api/analyze_behavior` - quick-check scoring of one user's
/// activity record.
pub async fn analyze_behavior(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    state.stats.record_request();

    let activity: UserActivity = parse_body(&state, &body)?;
    let summary = state.behavior.quick_scan(&activity);
    state
        .stats
        .record_behavior_scan(&summary.user_id, summary.is_suspicious);

    Ok(success(json!({
        "user_id": summary.user_id,
        "comment_count": summary.comment_count,
        "ip_variety": summary.ip_variety,
        "ip_similarity": summary.ip_similarity,
        "is_suspicious": summary.is_suspicious,
        "risk_score": summary.risk_score,
    })))
}

/// Deserialize a POST body inside the handler so malformed input lands in
/// the 500 envelope instead of an extractor-level 4xx.
fn parse_body<T: serde::de::DeserializeOwned>(state: &AppState, body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        state.stats.record_parse_failure();
        warn!("Failed to parse request body: {}", e);
        ApiError(e.to_string())
    })
}
