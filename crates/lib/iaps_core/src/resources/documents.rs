//! Document metadata operations.
//!
//! Only metadata lives here; the bytes go to an opaque blob store keyed by
//! the generated `storage_ref`.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::member_semester_in;
use crate::models::DocumentRow;
use crate::roster::{EngineError, Result, is_cr};
use crate::uuid::uuidv7;

/// File extensions accepted for upload.
const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "ppt", "pptx", "txt", "png", "jpg", "jpeg",
];

/// Upload size cap: 10 MiB.
const MAX_FILE_SIZE: i64 = 10 * 1024 * 1024;

/// Check a filename against the allowed extension list.
fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Build the opaque storage reference for an upload.
fn storage_ref_for(actor: Uuid, filename: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    format!("uploads/{stamp}_{actor}_{filename}")
}

/// Record document metadata for an upload. Any classroom member.
pub async fn create_document(
    pool: &PgPool,
    classroom_id: Uuid,
    semester_id: Uuid,
    actor: Uuid,
    doc_type: &str,
    filename: &str,
    size_bytes: i64,
    use_for_ai: bool,
) -> Result<DocumentRow> {
    let filename = filename.trim();
    if filename.is_empty() {
        return Err(EngineError::Validation("Filename is required".into()));
    }
    if !allowed_file(filename) {
        return Err(EngineError::Validation(format!(
            "File type not allowed. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    if size_bytes < 0 || size_bytes > MAX_FILE_SIZE {
        return Err(EngineError::Validation(
            "File exceeds the 10 MiB size limit".into(),
        ));
    }

    member_semester_in(pool, classroom_id, semester_id, actor).await?;

    let doc_type = if doc_type.trim().is_empty() {
        "resource"
    } else {
        doc_type.trim()
    };

    let row = sqlx::query_as::<_, DocumentRow>(
        "INSERT INTO documents \
         (id, classroom_id, semester_id, uploaded_by, doc_type, filename, storage_ref, \
          size_bytes, use_for_ai) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING id, classroom_id, semester_id, uploaded_by, doc_type, filename, \
                   storage_ref, size_bytes, use_for_ai, created_at",
    )
    .bind(uuidv7())
    .bind(classroom_id)
    .bind(semester_id)
    .bind(actor)
    .bind(doc_type)
    .bind(filename)
    .bind(storage_ref_for(actor, filename))
    .bind(size_bytes)
    .bind(use_for_ai)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// List documents of a semester, newest-first, optionally filtered by type.
/// Member-gated.
pub async fn list_documents(
    pool: &PgPool,
    semester_id: Uuid,
    actor: Uuid,
    doc_type: Option<&str>,
) -> Result<Vec<DocumentRow>> {
    super::member_semester(pool, semester_id, actor).await?;

    let rows = sqlx::query_as::<_, DocumentRow>(
        "SELECT id, classroom_id, semester_id, uploaded_by, doc_type, filename, \
                storage_ref, size_bytes, use_for_ai, created_at \
         FROM documents \
         WHERE semester_id = $1 AND ($2::text IS NULL OR doc_type = $2) \
         ORDER BY created_at DESC",
    )
    .bind(semester_id)
    .bind(doc_type)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch a document by id.
async fn fetch_document(pool: &PgPool, document_id: Uuid) -> Result<DocumentRow> {
    sqlx::query_as::<_, DocumentRow>(
        "SELECT id, classroom_id, semester_id, uploaded_by, doc_type, filename, \
                storage_ref, size_bytes, use_for_ai, created_at \
         FROM documents WHERE id = $1",
    )
    .bind(document_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| EngineError::NotFound("Document not found".into()))
}

/// Fetch a document. Member-gated through its classroom.
pub async fn get_document(pool: &PgPool, document_id: Uuid, actor: Uuid) -> Result<DocumentRow> {
    let document = fetch_document(pool, document_id).await?;
    crate::roster::require_member(pool, document.classroom_id, actor).await?;
    Ok(document)
}

/// Delete a document. Uploader or a CR of its semester.
pub async fn delete_document(pool: &PgPool, document_id: Uuid, actor: Uuid) -> Result<()> {
    let document = fetch_document(pool, document_id).await?;

    let is_owner = document.uploaded_by == actor;
    if !is_owner && !is_cr(pool, document.semester_id, actor).await? {
        return Err(EngineError::Forbidden("Permission denied".into()));
    }

    sqlx::query("DELETE FROM documents WHERE id = $1")
        .bind(document_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Toggle the AI-usage flag. CR of the document's semester only. Returns
/// the new value.
pub async fn toggle_ai(pool: &PgPool, document_id: Uuid, actor: Uuid) -> Result<bool> {
    let document = fetch_document(pool, document_id).await?;

    if !is_cr(pool, document.semester_id, actor).await? {
        return Err(EngineError::Forbidden("CR privileges required".into()));
    }

    let new_value = sqlx::query_scalar::<_, bool>(
        "UPDATE documents SET use_for_ai = NOT use_for_ai WHERE id = $1 \
         RETURNING use_for_ai",
    )
    .bind(document_id)
    .fetch_one(pool)
    .await?;
    Ok(new_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_filter() {
        assert!(allowed_file("notes.pdf"));
        assert!(allowed_file("slides.PPTX"));
        assert!(allowed_file("archive.tar.txt"));
        assert!(!allowed_file("malware.exe"));
        assert!(!allowed_file("no_extension"));
    }

    #[test]
    fn storage_ref_embeds_uploader_and_filename() {
        let actor = Uuid::new_v4();
        let r = storage_ref_for(actor, "notes.pdf");
        assert!(r.starts_with("uploads/"));
        assert!(r.contains(&actor.to_string()));
        assert!(r.ends_with("notes.pdf"));
    }
}
