//! Attachment-layer domain models: subjects, documents, todos.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Row returned by subject queries.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SubjectRow {
    pub id: Uuid,
    pub classroom_id: Uuid,
    pub semester_id: Uuid,
    pub name: String,
    pub code: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Row returned by document metadata queries.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub classroom_id: Uuid,
    pub semester_id: Uuid,
    pub uploaded_by: Uuid,
    pub doc_type: String,
    pub filename: String,
    pub storage_ref: String,
    pub size_bytes: i64,
    pub use_for_ai: bool,
    pub created_at: DateTime<Utc>,
}

/// Row returned by todo queries.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TodoRow {
    pub id: Uuid,
    pub classroom_id: Uuid,
    pub semester_id: Uuid,
    pub text: String,
    pub completed: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
