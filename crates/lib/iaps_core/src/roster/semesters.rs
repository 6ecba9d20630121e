//! Semester session operations: lifecycle, active switching, CR seats.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{EngineError, Result, cr_ids, is_member, lock_classroom, require_member};
use crate::models::{SemesterDetail, SemesterRow};
use crate::uuid::uuidv7;

/// Fetch a semester row by id, without locking.
async fn fetch_semester<'e>(
    exec: impl sqlx::PgExecutor<'e>,
    semester_id: Uuid,
) -> Result<SemesterRow> {
    sqlx::query_as::<_, SemesterRow>(
        "SELECT id, classroom_id, name, is_active, created_at, archived_at \
         FROM semesters WHERE id = $1",
    )
    .bind(semester_id)
    .fetch_optional(exec)
    .await?
    .ok_or_else(|| EngineError::NotFound("Semester not found".into()))
}

/// Re-read a semester inside a transaction after its classroom is locked;
/// it may have been deleted while we waited for the lock.
async fn refetch_semester(conn: &mut PgConnection, semester_id: Uuid) -> Result<SemesterRow> {
    fetch_semester(&mut *conn, semester_id).await
}

/// Create a new semester session for a classroom.
///
/// The actor must be a member; if an active semester exists, the actor must
/// be one of its CRs. All currently active semesters are archived
/// (`archived_at` stamped) and the new one becomes active. CR seeding
/// depends on `inherit_crs`: `false` seats only the actor, `true` carries
/// over the previous active semester's CR list.
pub async fn create_semester(
    pool: &PgPool,
    classroom_id: Uuid,
    name: &str,
    actor: Uuid,
    inherit_crs: bool,
) -> Result<SemesterDetail> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::Validation("Semester name is required".into()));
    }

    let mut tx = pool.begin().await?;
    lock_classroom(&mut tx, classroom_id).await?;
    require_member(&mut *tx, classroom_id, actor).await?;

    let previous = super::active_semester(&mut *tx, classroom_id).await?;
    if let Some(active) = &previous
        && !super::is_cr(&mut *tx, active.id, actor).await?
    {
        return Err(EngineError::Forbidden("CR privileges required".into()));
    }

    sqlx::query(
        "UPDATE semesters SET is_active = FALSE, archived_at = now() \
         WHERE classroom_id = $1 AND is_active",
    )
    .bind(classroom_id)
    .execute(&mut *tx)
    .await?;

    let seats = match (&previous, inherit_crs) {
        (Some(active), true) => cr_ids(&mut *tx, active.id).await?,
        _ => vec![actor],
    };

    let semester = sqlx::query_as::<_, SemesterRow>(
        "INSERT INTO semesters (id, classroom_id, name, is_active) \
         VALUES ($1, $2, $3, TRUE) \
         RETURNING id, classroom_id, name, is_active, created_at, archived_at",
    )
    .bind(uuidv7())
    .bind(classroom_id)
    .bind(name)
    .fetch_one(&mut *tx)
    .await?;

    for user_id in &seats {
        sqlx::query(
            "INSERT INTO semester_crs (semester_id, user_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(semester.id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(SemesterDetail::from_row(semester, seats))
}

/// Seat a classroom member as CR of a semester. Actor must already hold a
/// seat in that semester; fails `Conflict` if the target already does.
pub async fn add_cr(pool: &PgPool, semester_id: Uuid, target: Uuid, actor: Uuid) -> Result<()> {
    let semester = fetch_semester(pool, semester_id).await?;

    let mut tx = pool.begin().await?;
    lock_classroom(&mut tx, semester.classroom_id).await?;
    refetch_semester(&mut tx, semester_id).await?;

    if !super::is_cr(&mut *tx, semester_id, actor).await? {
        return Err(EngineError::Forbidden("CR privileges required".into()));
    }
    if !is_member(&mut *tx, semester.classroom_id, target).await? {
        return Err(EngineError::Validation(
            "User is not a classroom member".into(),
        ));
    }

    let inserted = sqlx::query(
        "INSERT INTO semester_crs (semester_id, user_id) VALUES ($1, $2) \
         ON CONFLICT DO NOTHING",
    )
    .bind(semester_id)
    .bind(target)
    .execute(&mut *tx)
    .await?;
    if inserted.rows_affected() == 0 {
        return Err(EngineError::Conflict("User is already a CR".into()));
    }

    tx.commit().await?;
    Ok(())
}

/// Remove a CR seat. Actor must hold a seat; removing the last seat is
/// rejected so every semester keeps at least one CR.
pub async fn remove_cr(pool: &PgPool, semester_id: Uuid, target: Uuid, actor: Uuid) -> Result<()> {
    let semester = fetch_semester(pool, semester_id).await?;

    let mut tx = pool.begin().await?;
    lock_classroom(&mut tx, semester.classroom_id).await?;
    refetch_semester(&mut tx, semester_id).await?;

    if !super::is_cr(&mut *tx, semester_id, actor).await? {
        return Err(EngineError::Forbidden("CR privileges required".into()));
    }
    if !super::is_cr(&mut *tx, semester_id, target).await? {
        return Err(EngineError::NotFound(
            "User is not a CR of this semester".into(),
        ));
    }

    let seat_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM semester_crs WHERE semester_id = $1",
    )
    .bind(semester_id)
    .fetch_one(&mut *tx)
    .await?;
    if seat_count <= 1 {
        return Err(EngineError::InvalidOperation(
            "Cannot remove the last CR. Add another CR first.".into(),
        ));
    }

    sqlx::query("DELETE FROM semester_crs WHERE semester_id = $1 AND user_id = $2")
        .bind(semester_id)
        .bind(target)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Switch which semester is active. Membership is enough; this changes the
/// active flag only and does not stamp `archived_at`.
pub async fn switch_active_semester(
    pool: &PgPool,
    semester_id: Uuid,
    actor: Uuid,
) -> Result<SemesterRow> {
    let semester = fetch_semester(pool, semester_id).await?;

    let mut tx = pool.begin().await?;
    lock_classroom(&mut tx, semester.classroom_id).await?;
    refetch_semester(&mut tx, semester_id).await?;
    require_member(&mut *tx, semester.classroom_id, actor).await?;

    sqlx::query("UPDATE semesters SET is_active = FALSE WHERE classroom_id = $1")
        .bind(semester.classroom_id)
        .execute(&mut *tx)
        .await?;

    let activated = sqlx::query_as::<_, SemesterRow>(
        "UPDATE semesters SET is_active = TRUE WHERE id = $1 \
         RETURNING id, classroom_id, name, is_active, created_at, archived_at",
    )
    .bind(semester_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(activated)
}

/// Delete a semester. Actor must hold a CR seat in it; the classroom's only
/// semester cannot be deleted. Subjects, todos and documents scoped to it
/// go with it (FK cascade). Deleting the active semester promotes the most
/// recently created remaining one.
pub async fn delete_semester(pool: &PgPool, semester_id: Uuid, actor: Uuid) -> Result<()> {
    let semester = fetch_semester(pool, semester_id).await?;

    let mut tx = pool.begin().await?;
    lock_classroom(&mut tx, semester.classroom_id).await?;
    let semester = refetch_semester(&mut tx, semester_id).await?;

    if !super::is_cr(&mut *tx, semester_id, actor).await? {
        return Err(EngineError::Forbidden("CR privileges required".into()));
    }

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM semesters WHERE classroom_id = $1",
    )
    .bind(semester.classroom_id)
    .fetch_one(&mut *tx)
    .await?;
    if total <= 1 {
        return Err(EngineError::InvalidOperation(
            "Cannot delete the only semester of a classroom".into(),
        ));
    }

    sqlx::query("DELETE FROM semesters WHERE id = $1")
        .bind(semester_id)
        .execute(&mut *tx)
        .await?;

    if semester.is_active {
        sqlx::query(
            "UPDATE semesters SET is_active = TRUE WHERE id = ( \
                 SELECT id FROM semesters WHERE classroom_id = $1 \
                 ORDER BY created_at DESC, id DESC LIMIT 1)",
        )
        .bind(semester.classroom_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// List all semesters of a classroom, newest-first, with CR seats attached.
/// Member-gated.
pub async fn list_semesters(
    pool: &PgPool,
    classroom_id: Uuid,
    actor: Uuid,
) -> Result<Vec<SemesterDetail>> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM classrooms WHERE id = $1)",
    )
    .bind(classroom_id)
    .fetch_one(pool)
    .await?;
    if !exists {
        return Err(EngineError::NotFound("Classroom not found".into()));
    }
    require_member(pool, classroom_id, actor).await?;

    let rows = sqlx::query_as::<_, SemesterRow>(
        "SELECT id, classroom_id, name, is_active, created_at, archived_at \
         FROM semesters WHERE classroom_id = $1 \
         ORDER BY created_at DESC",
    )
    .bind(classroom_id)
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let seats = cr_ids(pool, row.id).await?;
        out.push(SemesterDetail::from_row(row, seats));
    }
    Ok(out)
}

/// Fetch one semester with CR seats. Member-gated.
pub async fn get_semester(pool: &PgPool, semester_id: Uuid, actor: Uuid) -> Result<SemesterDetail> {
    let row = fetch_semester(pool, semester_id).await?;
    require_member(pool, row.classroom_id, actor).await?;
    let seats = cr_ids(pool, row.id).await?;
    Ok(SemesterDetail::from_row(row, seats))
}
