//! Subject operations. CR-gated creation and deletion, member-gated reads.

use sqlx::PgPool;
use uuid::Uuid;

use super::{member_semester, member_semester_in};
use crate::models::SubjectRow;
use crate::roster::{EngineError, Result, is_cr};
use crate::uuid::uuidv7;

/// Create a subject in a semester. CR only; subject names are unique per
/// semester case-insensitively.
pub async fn create_subject(
    pool: &PgPool,
    classroom_id: Uuid,
    semester_id: Uuid,
    name: &str,
    code: &str,
    actor: Uuid,
) -> Result<SubjectRow> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::Validation("Subject name is required".into()));
    }

    let semester = member_semester_in(pool, classroom_id, semester_id, actor).await?;
    if !is_cr(pool, semester.id, actor).await? {
        return Err(EngineError::Forbidden("Only a CR can add subjects".into()));
    }

    // The unique index on (semester_id, LOWER(name)) turns a duplicate into
    // zero inserted rows, concurrent creators included.
    let row = sqlx::query_as::<_, SubjectRow>(
        "INSERT INTO subjects (id, classroom_id, semester_id, name, code, created_by) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT DO NOTHING \
         RETURNING id, classroom_id, semester_id, name, code, created_by, created_at",
    )
    .bind(uuidv7())
    .bind(classroom_id)
    .bind(semester_id)
    .bind(name)
    .bind(code.trim())
    .bind(actor)
    .fetch_optional(pool)
    .await?;

    row.ok_or_else(|| {
        EngineError::Conflict("A subject with this name already exists in this semester".into())
    })
}

/// List subjects of a semester, oldest-first (stable curriculum ordering).
/// Member-gated.
pub async fn list_subjects(
    pool: &PgPool,
    semester_id: Uuid,
    actor: Uuid,
) -> Result<Vec<SubjectRow>> {
    member_semester(pool, semester_id, actor).await?;

    let rows = sqlx::query_as::<_, SubjectRow>(
        "SELECT id, classroom_id, semester_id, name, code, created_by, created_at \
         FROM subjects WHERE semester_id = $1 \
         ORDER BY created_at ASC",
    )
    .bind(semester_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Delete a subject. CR of its semester only.
pub async fn delete_subject(pool: &PgPool, subject_id: Uuid, actor: Uuid) -> Result<()> {
    let subject = sqlx::query_as::<_, SubjectRow>(
        "SELECT id, classroom_id, semester_id, name, code, created_by, created_at \
         FROM subjects WHERE id = $1",
    )
    .bind(subject_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| EngineError::NotFound("Subject not found".into()))?;

    if !is_cr(pool, subject.semester_id, actor).await? {
        return Err(EngineError::Forbidden(
            "Only a CR can delete subjects".into(),
        ));
    }

    sqlx::query("DELETE FROM subjects WHERE id = $1")
        .bind(subject_id)
        .execute(pool)
        .await?;
    Ok(())
}
