//! AI request handlers — canned stubs behind real access checks.
//!
//! The responses are placeholders until the inference pipeline lands; the
//! membership and existence checks are the real ones.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use iaps_core::resources::documents;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub document_id: Uuid,
    pub semester_id: Uuid,
    #[serde(default)]
    pub summary_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FlashcardsRequest {
    pub document_id: Uuid,
    pub semester_id: Uuid,
    #[serde(default)]
    pub count: Option<u32>,
}

/// `POST /api/ai/summary` — canned document summary.
pub async fn summary_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<SummaryRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let document = documents::get_document(&state.pool, body.document_id, user.0.sub).await?;
    if document.semester_id != body.semester_id {
        return Err(crate::error::AppError::NotFound("Semester not found".into()));
    }

    let summary_type = body.summary_type.as_deref().unwrap_or("brief");
    let filename = &document.filename;
    let summary = match summary_type {
        "detailed" => format!(
            "This is a detailed summary of {filename}.\n\nSection 1: [Content]\nSection 2: [Content]\nSection 3: [Content]\n\n[AI Detailed Summary will be generated here]"
        ),
        "bullet-points" => format!(
            "Summary of {filename}:\n\u{2022} Key Point 1\n\u{2022} Key Point 2\n\u{2022} Key Point 3\n\n[AI Bullet Points will be generated here]"
        ),
        _ => format!(
            "This is a brief summary of {filename}. [AI Summary will be generated here]"
        ),
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "summary": summary,
        "type": summary_type,
        "document_id": body.document_id,
        "note": "This is a stub response. Actual AI implementation pending.",
    })))
}

/// `POST /api/ai/flashcards` — canned flashcard set (up to 10 cards).
pub async fn flashcards_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<FlashcardsRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let document = documents::get_document(&state.pool, body.document_id, user.0.sub).await?;
    if document.semester_id != body.semester_id {
        return Err(crate::error::AppError::NotFound("Semester not found".into()));
    }

    let count = body.count.unwrap_or(10).min(10);
    let flashcards: Vec<_> = (1..=count)
        .map(|i| {
            serde_json::json!({
                "id": format!("fc_{i}"),
                "question": format!("Sample Question {i} from {}?", document.filename),
                "answer": format!("Sample Answer {i} [AI will generate actual content]"),
                "difficulty": "medium",
                "topic": "General",
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "flashcards": flashcards,
        "document_id": body.document_id,
        "note": "This is a stub response. Actual AI implementation pending.",
    })))
}
