//! Membership & role engine.
//!
//! Classroom membership, the join-request workflow, semester lifecycle and
//! CR (class representative) privileges. Every mutating operation runs in a
//! transaction that locks the classroom row (`SELECT ... FOR UPDATE`), which
//! serializes semester- and membership-mutating operations per classroom and
//! keeps the multi-row invariants intact:
//!
//! - the creator is always a member and can never be removed,
//! - exactly one semester per classroom is active,
//! - every semester keeps at least one CR.

pub mod classrooms;
pub mod semesters;

use sqlx::PgConnection;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ClassroomRow, SemesterRow};

/// Errors produced by the membership & role engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Load a classroom row and lock it for the duration of the transaction.
///
/// This is the per-classroom serialization point for all operations that
/// touch membership or the semester set.
pub(crate) async fn lock_classroom(
    conn: &mut PgConnection,
    classroom_id: Uuid,
) -> Result<ClassroomRow> {
    let row = sqlx::query_as::<_, ClassroomRow>(
        "SELECT id, name, description, join_code, created_by, created_at, updated_at \
         FROM classrooms WHERE id = $1 FOR UPDATE",
    )
    .bind(classroom_id)
    .fetch_optional(&mut *conn)
    .await?;
    row.ok_or_else(|| EngineError::NotFound("Classroom not found".into()))
}

/// Check whether a user is a member of a classroom.
pub async fn is_member<'e>(
    exec: impl sqlx::PgExecutor<'e>,
    classroom_id: Uuid,
    user_id: Uuid,
) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM classroom_members \
         WHERE classroom_id = $1 AND user_id = $2)",
    )
    .bind(classroom_id)
    .bind(user_id)
    .fetch_one(exec)
    .await?;
    Ok(exists)
}

/// Fail with `Forbidden` unless the user is a member of the classroom.
pub async fn require_member<'e>(
    exec: impl sqlx::PgExecutor<'e>,
    classroom_id: Uuid,
    user_id: Uuid,
) -> Result<()> {
    if is_member(exec, classroom_id, user_id).await? {
        Ok(())
    } else {
        Err(EngineError::Forbidden(
            "Not a member of this classroom".into(),
        ))
    }
}

/// Fetch the currently active semester of a classroom, if any.
pub async fn active_semester<'e>(
    exec: impl sqlx::PgExecutor<'e>,
    classroom_id: Uuid,
) -> Result<Option<SemesterRow>> {
    let row = sqlx::query_as::<_, SemesterRow>(
        "SELECT id, classroom_id, name, is_active, created_at, archived_at \
         FROM semesters WHERE classroom_id = $1 AND is_active \
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(classroom_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

/// Check whether a user holds a CR seat in a semester.
pub async fn is_cr<'e>(
    exec: impl sqlx::PgExecutor<'e>,
    semester_id: Uuid,
    user_id: Uuid,
) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM semester_crs \
         WHERE semester_id = $1 AND user_id = $2)",
    )
    .bind(semester_id)
    .bind(user_id)
    .fetch_one(exec)
    .await?;
    Ok(exists)
}

/// Fail with `Forbidden` unless the actor is a CR of the classroom's
/// currently active semester. Returns that semester.
///
/// CR seats in archived semesters grant nothing here: administrative
/// actions are gated on the active semester only.
pub(crate) async fn require_active_cr(
    conn: &mut PgConnection,
    classroom_id: Uuid,
    actor: Uuid,
) -> Result<SemesterRow> {
    let Some(active) = active_semester(&mut *conn, classroom_id).await? else {
        return Err(EngineError::Forbidden(
            "Classroom has no active semester".into(),
        ));
    };
    if !is_cr(&mut *conn, active.id, actor).await? {
        return Err(EngineError::Forbidden("CR privileges required".into()));
    }
    Ok(active)
}

/// Fetch the CR seat holders of a semester.
pub async fn cr_ids<'e>(
    exec: impl sqlx::PgExecutor<'e>,
    semester_id: Uuid,
) -> Result<Vec<Uuid>> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        "SELECT user_id FROM semester_crs WHERE semester_id = $1",
    )
    .bind(semester_id)
    .fetch_all(exec)
    .await?;
    Ok(ids)
}
