//! Subject request handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use iaps_core::resources::subjects;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct CreateSubjectRequest {
    pub classroom_id: Uuid,
    pub semester_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub code: String,
}

/// `POST /api/subject/create` — add a subject to a semester. CR only.
pub async fn create_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<CreateSubjectRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let subject = subjects::create_subject(
        &state.pool,
        body.classroom_id,
        body.semester_id,
        &body.name,
        &body.code,
        user.0.sub,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Subject added",
            "subject": subject,
        })),
    ))
}

/// `GET /api/subject/semester/{id}/list` — subjects of a semester, oldest-first.
pub async fn list_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(semester_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let rows = subjects::list_subjects(&state.pool, semester_id, user.0.sub).await?;
    Ok(Json(serde_json::json!({"subjects": rows})))
}

/// `DELETE /api/subject/{id}` — delete a subject. CR only.
pub async fn delete_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(subject_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    subjects::delete_subject(&state.pool, subject_id, user.0.sub).await?;
    Ok(Json(serde_json::json!({"message": "Subject deleted"})))
}
