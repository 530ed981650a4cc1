use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::api::routes::{self, AppState};

/// The public HTTP surface of the service.
pub struct ApiServer {
    state: AppState,
    bind_addr: String,
}

impl ApiServer {
    pub fn new(state: AppState, bind_addr: String) -> Self {
        Self { state, bind_addr }
    }

    /// Build the application router. The detection frontend is a
    /// cross-origin browser app, so CORS is wide open; there is no
    /// authentication on this surface.
    pub fn router(state: AppState) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/", get(routes::home))
            .route("/health", get(routes::health))
            .route("/api/test", get(routes::test_api))
            .route("/api/detect_cluster", post(routes::detect_cluster))
            .route("/api/analyze_behavior", post(routes::analyze_behavior))
            .layer(cors)
            .with_state(state)
    }

    /// Bind and serve until the task is aborted.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = Self::router(self.state.clone());

        let listener = tokio::net::TcpListener::bind(&self.bind_addr).await?;
        info!("API listening on {}", self.bind_addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
