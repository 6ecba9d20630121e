//! Document metadata request handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use iaps_core::resources::documents;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub classroom_id: Uuid,
    pub semester_id: Uuid,
    pub filename: String,
    #[serde(default)]
    pub doc_type: String,
    #[serde(default)]
    pub size_bytes: i64,
    #[serde(default)]
    pub use_for_ai: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub doc_type: Option<String>,
}

/// `POST /api/document/upload` — record upload metadata. Any member.
pub async fn upload_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<UploadRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let document = documents::create_document(
        &state.pool,
        body.classroom_id,
        body.semester_id,
        user.0.sub,
        &body.doc_type,
        &body.filename,
        body.size_bytes,
        body.use_for_ai,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Document uploaded successfully",
            "document": document,
        })),
    ))
}

/// `GET /api/document/semester/{id}/list` — documents of a semester,
/// newest-first, optional `doc_type` filter.
pub async fn list_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(semester_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<serde_json::Value>> {
    let rows = documents::list_documents(
        &state.pool,
        semester_id,
        user.0.sub,
        params.doc_type.as_deref(),
    )
    .await?;
    Ok(Json(serde_json::json!({"documents": rows})))
}

/// `PATCH /api/document/{id}/toggle-ai` — toggle the AI-usage flag. CR only.
pub async fn toggle_ai_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(document_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let use_for_ai = documents::toggle_ai(&state.pool, document_id, user.0.sub).await?;
    Ok(Json(serde_json::json!({
        "message": "AI usage flag updated",
        "use_for_ai": use_for_ai,
    })))
}

/// `DELETE /api/document/{id}` — delete a document. Uploader or CR.
pub async fn delete_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(document_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    documents::delete_document(&state.pool, document_id, user.0.sub).await?;
    Ok(Json(serde_json::json!({"message": "Document deleted successfully"})))
}
