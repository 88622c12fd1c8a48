use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use storage::Database;

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "API and database are reachable"),
        (status = 503, description = "Database unreachable")
    ),
    tag = "health"
)]
pub async fn health(State(db): State<Database>) -> (StatusCode, Json<Value>) {
    match sqlx::query("SELECT 1").execute(db.pool()).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
