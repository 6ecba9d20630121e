//! Semester session request handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use iaps_core::roster::semesters;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct CreateSemesterRequest {
    pub classroom_id: Uuid,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TargetUserRequest {
    pub user_id: Uuid,
}

/// `POST /api/semester/create` — create a new semester session.
///
/// Archives the previous active semester; CR seeding follows the
/// `SEMESTER_INHERIT_CRS` configuration.
pub async fn create_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<CreateSemesterRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let semester = semesters::create_semester(
        &state.pool,
        body.classroom_id,
        &body.name,
        user.0.sub,
        state.config.inherit_semester_crs,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "New semester created successfully",
            "semester": semester,
        })),
    ))
}

/// `GET /api/semester/classroom/{id}/list` — all semesters of a classroom.
pub async fn list_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(classroom_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let rows = semesters::list_semesters(&state.pool, classroom_id, user.0.sub).await?;
    let actor = user.0.sub;
    let semesters: Vec<_> = rows
        .into_iter()
        .map(|s| {
            let is_cr = s.is_cr(actor);
            serde_json::json!({
                "id": s.id,
                "classroom_id": s.classroom_id,
                "name": s.name,
                "is_active": s.is_active,
                "cr_ids": s.cr_ids,
                "is_cr": is_cr,
                "created_at": s.created_at,
                "archived_at": s.archived_at,
            })
        })
        .collect();
    Ok(Json(serde_json::json!({"semesters": semesters})))
}

/// `GET /api/semester/{id}` — semester detail.
pub async fn get_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(semester_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let semester = semesters::get_semester(&state.pool, semester_id, user.0.sub).await?;
    let is_cr = semester.is_cr(user.0.sub);
    Ok(Json(serde_json::json!({
        "semester": {
            "id": semester.id,
            "classroom_id": semester.classroom_id,
            "name": semester.name,
            "is_active": semester.is_active,
            "cr_ids": semester.cr_ids,
            "is_cr": is_cr,
            "created_at": semester.created_at,
            "archived_at": semester.archived_at,
        },
    })))
}

/// `POST /api/semester/{id}/add-cr` — seat a member as CR.
pub async fn add_cr_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(semester_id): Path<Uuid>,
    Json(body): Json<TargetUserRequest>,
) -> AppResult<Json<serde_json::Value>> {
    semesters::add_cr(&state.pool, semester_id, body.user_id, user.0.sub).await?;
    Ok(Json(serde_json::json!({"message": "CR added successfully"})))
}

/// `POST /api/semester/{id}/remove-cr` — remove a CR seat.
pub async fn remove_cr_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(semester_id): Path<Uuid>,
    Json(body): Json<TargetUserRequest>,
) -> AppResult<Json<serde_json::Value>> {
    semesters::remove_cr(&state.pool, semester_id, body.user_id, user.0.sub).await?;
    Ok(Json(serde_json::json!({"message": "CR removed successfully"})))
}

/// `POST /api/semester/{id}/switch-active` — change the active semester.
pub async fn switch_active_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(semester_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let semester =
        semesters::switch_active_semester(&state.pool, semester_id, user.0.sub).await?;
    Ok(Json(serde_json::json!({
        "message": "Active semester switched successfully",
        "semester": semester,
    })))
}

/// `DELETE /api/semester/{id}` — delete a semester (CR only; never the last).
pub async fn delete_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(semester_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    semesters::delete_semester(&state.pool, semester_id, user.0.sub).await?;
    Ok(Json(serde_json::json!({"message": "Semester deleted successfully"})))
}
