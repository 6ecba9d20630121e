//! Todo request handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use iaps_core::resources::todos;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub classroom_id: Uuid,
    pub semester_id: Uuid,
    pub text: String,
}

/// `POST /api/todo/create` — create a todo. Any member.
pub async fn create_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<CreateTodoRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let todo = todos::create_todo(
        &state.pool,
        body.classroom_id,
        body.semester_id,
        &body.text,
        user.0.sub,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Todo created",
            "todo": todo,
        })),
    ))
}

/// `GET /api/todo/semester/{id}/list` — todos of a semester, newest-first.
pub async fn list_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(semester_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let rows = todos::list_todos(&state.pool, semester_id, user.0.sub).await?;
    Ok(Json(serde_json::json!({"todos": rows})))
}

/// `PATCH /api/todo/{id}/toggle` — toggle completion. Any member.
pub async fn toggle_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(todo_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let todo = todos::toggle_todo(&state.pool, todo_id, user.0.sub).await?;
    Ok(Json(serde_json::json!({
        "message": "Todo updated",
        "completed": todo.completed,
    })))
}

/// `DELETE /api/todo/{id}` — delete a todo. Creator or CR.
pub async fn delete_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(todo_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    todos::delete_todo(&state.pool, todo_id, user.0.sub).await?;
    Ok(Json(serde_json::json!({"message": "Todo deleted"})))
}
