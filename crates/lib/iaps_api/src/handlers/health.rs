//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::error::AppResult;

/// `GET /api/health` — service liveness plus database reachability.
pub async fn health_handler(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let db_connected = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .is_ok();

    Ok(Json(serde_json::json!({
        "status": if db_connected { "healthy" } else { "degraded" },
        "service": "IAPS Backend API",
        "version": iaps_core::version(),
        "db_connected": db_connected,
    })))
}
