//! Health check endpoints

use axum::Json;
use axum::extract::State;

use crate::error::internal;
use crate::state::AppState;

use super::ApiResult;

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "pos-cloud",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/test-db
pub async fn test_db(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    let now = crate::db::now(&state.pool).await.map_err(internal)?;
    Ok(Json(serde_json::json!({ "now": now })))
}
