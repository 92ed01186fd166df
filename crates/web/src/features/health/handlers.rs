use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{Database, health::HealthStatus};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store reachable and schema in place", body = HealthStatus),
        (status = 503, description = "Store unreachable or schema not ready", body = HealthStatus)
    ),
    tag = "health"
)]
pub async fn health(State(db): State<Database>) -> Response {
    let status = db.health_check().await;

    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        tracing::debug!("Health check degraded: {}", status.detail);
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(status)).into_response()
}
