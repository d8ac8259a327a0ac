use crate::api::AppState;
use crate::error::AppError;
use axum::extract::State;
use axum::Json;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Ready once the store answers; reports how far indexing has progressed.
pub async fn ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let cursor = state.store.load_cursor().await?;
    Ok(Json(serde_json::json!({
        "status": "ready",
        "cursor": cursor.map(|c| c.to_string()),
    })))
}
