use axum::{extract::State, http::Method, routing::post, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    error::AppError,
    models::RiskReport,
    services::report,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/reports/refresh", post(refresh_report))
        .layer(cors)
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    #[serde(flatten)]
    report: RiskReport,
    /// Time spent refreshing since the process started.
    session_seconds: f64,
}

async fn refresh_report(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshResponse>, AppError> {
    let start = std::time::Instant::now();
    tracing::info!("Refreshing risk report");

    let config = state.config.clone();
    let report = tokio::task::spawn_blocking(move || report::build_report(&config))
        .await
        .map_err(|e| {
            tracing::error!("Report task failed: {}", e);
            AppError::Internal(format!("report task failed: {}", e))
        })?;

    let session = state.session.add(report.timings.total());
    tracing::info!(
        "Refresh completed in {:?}, session total {:.4} seconds",
        start.elapsed(),
        session.as_secs_f64()
    );

    Ok(Json(RefreshResponse {
        report,
        session_seconds: session.as_secs_f64(),
    }))
}
