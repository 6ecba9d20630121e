//! Resource attachment layer: subjects, documents, todos.
//!
//! Every resource is scoped to a classroom + semester and permission-checked
//! through the roster engine: membership gates read/create, CR seats gate
//! administrative mutation, owner-or-CR gates deletion.

pub mod documents;
pub mod subjects;
pub mod todos;

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::SemesterRow;
use crate::roster::{EngineError, Result, require_member};

/// Fetch a semester and require the actor to be a member of its classroom.
pub(crate) async fn member_semester(
    pool: &PgPool,
    semester_id: Uuid,
    actor: Uuid,
) -> Result<SemesterRow> {
    let semester = sqlx::query_as::<_, SemesterRow>(
        "SELECT id, classroom_id, name, is_active, created_at, archived_at \
         FROM semesters WHERE id = $1",
    )
    .bind(semester_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| EngineError::NotFound("Semester not found".into()))?;

    require_member(pool, semester.classroom_id, actor).await?;
    Ok(semester)
}

/// Like [`member_semester`], but also checks the semester belongs to the
/// classroom named in the request.
pub(crate) async fn member_semester_in(
    pool: &PgPool,
    classroom_id: Uuid,
    semester_id: Uuid,
    actor: Uuid,
) -> Result<SemesterRow> {
    let semester = member_semester(pool, semester_id, actor).await?;
    if semester.classroom_id != classroom_id {
        return Err(EngineError::Validation(
            "Semester does not belong to this classroom".into(),
        ));
    }
    Ok(semester)
}
