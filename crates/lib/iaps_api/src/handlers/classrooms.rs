//! Classroom request handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use iaps_core::roster::classrooms;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::services::auth::send_invite_mail;

#[derive(Debug, Deserialize)]
pub struct CreateClassroomRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestJoinRequest {
    pub join_code: String,
}

#[derive(Debug, Deserialize)]
pub struct TargetUserRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct AcceptInviteRequest {
    pub token: String,
}

/// `POST /api/classroom/create` — create a classroom with its initial semester.
pub async fn create_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<CreateClassroomRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let (classroom, semester) =
        classrooms::create_classroom(&state.pool, user.0.sub, &body.name, &body.description)
            .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Classroom created successfully",
            "classroom": classroom,
            "semester": semester,
        })),
    ))
}

/// `POST /api/classroom/join/request` — request membership via join code.
pub async fn request_join_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<RequestJoinRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let classroom = classrooms::request_join(&state.pool, &body.join_code, user.0.sub).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Join request submitted",
            "classroom": {
                "id": classroom.id,
                "name": classroom.name,
                "description": classroom.description,
            },
        })),
    ))
}

/// `POST /api/classroom/{id}/approve` — approve a pending join request.
pub async fn approve_join_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(classroom_id): Path<Uuid>,
    Json(body): Json<TargetUserRequest>,
) -> AppResult<Json<serde_json::Value>> {
    classrooms::approve_join(&state.pool, classroom_id, body.user_id, user.0.sub).await?;
    Ok(Json(serde_json::json!({"message": "Join request approved"})))
}

/// `POST /api/classroom/{id}/reject` — reject a pending join request.
pub async fn reject_join_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(classroom_id): Path<Uuid>,
    Json(body): Json<TargetUserRequest>,
) -> AppResult<Json<serde_json::Value>> {
    classrooms::reject_join(&state.pool, classroom_id, body.user_id, user.0.sub).await?;
    Ok(Json(serde_json::json!({"message": "Join request rejected"})))
}

/// `POST /api/classroom/{id}/remove-member` — remove a member.
pub async fn remove_member_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(classroom_id): Path<Uuid>,
    Json(body): Json<TargetUserRequest>,
) -> AppResult<Json<serde_json::Value>> {
    classrooms::remove_member(&state.pool, classroom_id, body.user_id, user.0.sub).await?;
    Ok(Json(serde_json::json!({"message": "Member removed"})))
}

/// `POST /api/classroom/{id}/invite` — invite a user by email.
pub async fn invite_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(classroom_id): Path<Uuid>,
    Json(body): Json<InviteRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let (token, classroom) =
        classrooms::invite_by_email(&state.pool, classroom_id, &body.email, user.0.sub).await?;

    send_invite_mail(&state, &body.email, &classroom.name, &user.0.username, &token);

    Ok(Json(serde_json::json!({
        "message": "Invitation sent",
        "email": body.email,
    })))
}

/// `POST /api/classroom/accept-invite` — redeem an invite token.
pub async fn accept_invite_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<AcceptInviteRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let classroom = classrooms::accept_invite(&state.pool, &body.token, user.0.sub).await?;
    Ok(Json(serde_json::json!({
        "message": "Joined classroom successfully",
        "classroom": {
            "id": classroom.id,
            "name": classroom.name,
            "description": classroom.description,
        },
    })))
}

/// `GET /api/classroom/list` — classrooms the caller belongs to.
pub async fn list_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<serde_json::Value>> {
    let rows = classrooms::list_classrooms(&state.pool, user.0.sub).await?;
    Ok(Json(serde_json::json!({"classrooms": rows})))
}

/// `GET /api/classroom/{id}` — classroom detail.
///
/// The join code and the pending-request list are visible to CRs of the
/// active semester only.
pub async fn get_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(classroom_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let detail = classrooms::get_classroom(&state.pool, classroom_id, user.0.sub).await?;

    let join_code = detail.is_active_cr.then_some(&detail.classroom.join_code);
    let join_requests = if detail.is_active_cr {
        serde_json::json!(detail.join_requests)
    } else {
        serde_json::json!([])
    };

    Ok(Json(serde_json::json!({
        "classroom": {
            "id": detail.classroom.id,
            "name": detail.classroom.name,
            "description": detail.classroom.description,
            "join_code": join_code,
            "created_by": detail.classroom.created_by,
            "created_at": detail.classroom.created_at,
            "members": detail.members,
            "join_requests": join_requests,
            "is_cr": detail.is_active_cr,
        },
    })))
}

/// `DELETE /api/classroom/{id}` — delete a classroom (creator only).
pub async fn delete_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(classroom_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    classrooms::delete_classroom(&state.pool, classroom_id, user.0.sub).await?;
    Ok(Json(serde_json::json!({"message": "Classroom deleted successfully"})))
}
