//! Classroom operations: creation, join workflow, membership, invites.

use rand::Rng;
use rand::rng;
use sqlx::PgPool;
use uuid::Uuid;

use super::{EngineError, Result, lock_classroom, require_active_cr, require_member};
use crate::models::{ClassroomRow, ClassroomSummary, JoinRequestInfo, MemberInfo, SemesterRow};
use crate::tokens;
use crate::uuid::uuidv7;

/// Join codes are 6 uppercase alphanumeric characters.
const JOIN_CODE_LEN: usize = 6;
const JOIN_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Collision-retry bound for join code allocation. At 36^6 codes a
/// collision is unlikely, but it is checked, not assumed.
const JOIN_CODE_MAX_ATTEMPTS: usize = 16;

/// Name given to the semester seeded at classroom creation.
const INITIAL_SEMESTER_NAME: &str = "Semester 1";

/// Generate a candidate join code.
fn generate_join_code() -> String {
    let mut r = rng();
    (0..JOIN_CODE_LEN)
        .map(|_| JOIN_CODE_CHARSET[r.random_range(0..JOIN_CODE_CHARSET.len())] as char)
        .collect()
}

/// Classroom detail projection: the classroom plus its members and, for
/// CRs of the active semester, the pending join requests.
#[derive(Debug, Clone)]
pub struct ClassroomDetail {
    pub classroom: ClassroomRow,
    pub members: Vec<MemberInfo>,
    pub join_requests: Vec<JoinRequestInfo>,
    /// Whether the caller is a CR of the currently active semester.
    pub is_active_cr: bool,
}

/// Create a classroom with the actor as sole member, plus its initial
/// active semester with the actor seated as CR.
///
/// Runs in one transaction: the classroom is never observable without an
/// active semester.
pub async fn create_classroom(
    pool: &PgPool,
    actor: Uuid,
    name: &str,
    description: &str,
) -> Result<(ClassroomRow, SemesterRow)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::Validation("Classroom name is required".into()));
    }

    let mut tx = pool.begin().await?;

    // Allocate a collision-free join code.
    let mut join_code = None;
    for _ in 0..JOIN_CODE_MAX_ATTEMPTS {
        let candidate = generate_join_code();
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM classrooms WHERE join_code = $1)",
        )
        .bind(&candidate)
        .fetch_one(&mut *tx)
        .await?;
        if !taken {
            join_code = Some(candidate);
            break;
        }
    }
    let join_code = join_code.ok_or_else(|| {
        EngineError::Internal("Could not allocate a unique join code".into())
    })?;

    let classroom = sqlx::query_as::<_, ClassroomRow>(
        "INSERT INTO classrooms (id, name, description, join_code, created_by) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, name, description, join_code, created_by, created_at, updated_at",
    )
    .bind(uuidv7())
    .bind(name)
    .bind(description.trim())
    .bind(&join_code)
    .bind(actor)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO classroom_members (classroom_id, user_id) VALUES ($1, $2)")
        .bind(classroom.id)
        .bind(actor)
        .execute(&mut *tx)
        .await?;

    let semester = sqlx::query_as::<_, SemesterRow>(
        "INSERT INTO semesters (id, classroom_id, name, is_active) \
         VALUES ($1, $2, $3, TRUE) \
         RETURNING id, classroom_id, name, is_active, created_at, archived_at",
    )
    .bind(uuidv7())
    .bind(classroom.id)
    .bind(INITIAL_SEMESTER_NAME)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO semester_crs (semester_id, user_id) VALUES ($1, $2)")
        .bind(semester.id)
        .bind(actor)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok((classroom, semester))
}

/// Request to join a classroom by its join code.
///
/// Fails `Conflict` if the actor is already a member or already has a
/// pending request.
pub async fn request_join(pool: &PgPool, join_code: &str, actor: Uuid) -> Result<ClassroomRow> {
    let join_code = join_code.trim().to_uppercase();
    if join_code.is_empty() {
        return Err(EngineError::Validation("Join code is required".into()));
    }

    let mut tx = pool.begin().await?;

    let classroom = sqlx::query_as::<_, ClassroomRow>(
        "SELECT id, name, description, join_code, created_by, created_at, updated_at \
         FROM classrooms WHERE join_code = $1 FOR UPDATE",
    )
    .bind(&join_code)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| EngineError::NotFound("Invalid join code".into()))?;

    if super::is_member(&mut *tx, classroom.id, actor).await? {
        return Err(EngineError::Conflict(
            "Already a member of this classroom".into(),
        ));
    }

    let inserted = sqlx::query(
        "INSERT INTO join_requests (classroom_id, user_id) VALUES ($1, $2) \
         ON CONFLICT DO NOTHING",
    )
    .bind(classroom.id)
    .bind(actor)
    .execute(&mut *tx)
    .await?;
    if inserted.rows_affected() == 0 {
        return Err(EngineError::Conflict(
            "Join request already pending".into(),
        ));
    }

    tx.commit().await?;
    Ok(classroom)
}

/// Approve a pending join request. Actor must be a CR of the classroom's
/// currently active semester. The membership insert is idempotent.
pub async fn approve_join(
    pool: &PgPool,
    classroom_id: Uuid,
    target: Uuid,
    actor: Uuid,
) -> Result<()> {
    let mut tx = pool.begin().await?;
    lock_classroom(&mut tx, classroom_id).await?;
    require_active_cr(&mut tx, classroom_id, actor).await?;

    let removed = sqlx::query(
        "DELETE FROM join_requests WHERE classroom_id = $1 AND user_id = $2",
    )
    .bind(classroom_id)
    .bind(target)
    .execute(&mut *tx)
    .await?;
    if removed.rows_affected() == 0 {
        return Err(EngineError::NotFound("No pending join request".into()));
    }

    sqlx::query(
        "INSERT INTO classroom_members (classroom_id, user_id) VALUES ($1, $2) \
         ON CONFLICT DO NOTHING",
    )
    .bind(classroom_id)
    .bind(target)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Reject a pending join request. Actor must be a CR of the active semester.
pub async fn reject_join(
    pool: &PgPool,
    classroom_id: Uuid,
    target: Uuid,
    actor: Uuid,
) -> Result<()> {
    let mut tx = pool.begin().await?;
    lock_classroom(&mut tx, classroom_id).await?;
    require_active_cr(&mut tx, classroom_id, actor).await?;

    let removed = sqlx::query(
        "DELETE FROM join_requests WHERE classroom_id = $1 AND user_id = $2",
    )
    .bind(classroom_id)
    .bind(target)
    .execute(&mut *tx)
    .await?;
    if removed.rows_affected() == 0 {
        return Err(EngineError::NotFound("No pending join request".into()));
    }

    tx.commit().await?;
    Ok(())
}

/// Remove a member from a classroom. Actor must be a CR of the active
/// semester; self-removal and removal of the creator are rejected.
///
/// The target also loses every CR seat in this classroom. A semester whose
/// only CR was the removed member gets the classroom creator seated
/// instead, so no semester is ever left without a CR.
pub async fn remove_member(
    pool: &PgPool,
    classroom_id: Uuid,
    target: Uuid,
    actor: Uuid,
) -> Result<()> {
    let mut tx = pool.begin().await?;
    let classroom = lock_classroom(&mut tx, classroom_id).await?;
    require_active_cr(&mut tx, classroom_id, actor).await?;

    if target == actor {
        return Err(EngineError::InvalidOperation(
            "Cannot remove yourself from the classroom".into(),
        ));
    }
    if target == classroom.created_by {
        return Err(EngineError::InvalidOperation(
            "The classroom creator cannot be removed".into(),
        ));
    }

    let removed = sqlx::query(
        "DELETE FROM classroom_members WHERE classroom_id = $1 AND user_id = $2",
    )
    .bind(classroom_id)
    .bind(target)
    .execute(&mut *tx)
    .await?;
    if removed.rows_affected() == 0 {
        return Err(EngineError::NotFound(
            "User is not a member of this classroom".into(),
        ));
    }

    sqlx::query(
        "DELETE FROM semester_crs USING semesters s \
         WHERE semester_crs.semester_id = s.id \
           AND s.classroom_id = $1 AND semester_crs.user_id = $2",
    )
    .bind(classroom_id)
    .bind(target)
    .execute(&mut *tx)
    .await?;

    // Re-seat the creator wherever the removed member held the only seat.
    sqlx::query(
        "INSERT INTO semester_crs (semester_id, user_id) \
         SELECT s.id, $2 FROM semesters s \
         WHERE s.classroom_id = $1 \
           AND NOT EXISTS (SELECT 1 FROM semester_crs c WHERE c.semester_id = s.id)",
    )
    .bind(classroom_id)
    .bind(classroom.created_by)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Issue a classroom invite token for an email address. Actor must be a CR
/// of the active semester; fails `Conflict` if a user with that email is
/// already a member.
///
/// Returns the opaque token (7-day expiry) and the classroom; mail delivery
/// is the caller's concern and does not affect issuance.
pub async fn invite_by_email(
    pool: &PgPool,
    classroom_id: Uuid,
    email: &str,
    actor: Uuid,
) -> Result<(String, ClassroomRow)> {
    let email = email.trim();
    if !crate::auth::validate_email(email) {
        return Err(EngineError::Validation("A valid email is required".into()));
    }

    let mut tx = pool.begin().await?;
    let classroom = lock_classroom(&mut tx, classroom_id).await?;
    require_active_cr(&mut tx, classroom_id, actor).await?;

    let already_member = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM classroom_members m \
         JOIN users u ON u.id = m.user_id \
         WHERE m.classroom_id = $1 AND LOWER(u.email) = LOWER($2))",
    )
    .bind(classroom_id)
    .bind(email)
    .fetch_one(&mut *tx)
    .await?;
    if already_member {
        return Err(EngineError::Conflict(
            "A user with this email is already a member".into(),
        ));
    }

    let token = tokens::issue_invite_token(&mut *tx, classroom_id, email, actor).await?;

    tx.commit().await?;
    Ok((token, classroom))
}

/// Accept a classroom invite. Consumes the token (at most once), adds the
/// actor to the classroom's members idempotently, and clears any pending
/// join request from the actor.
pub async fn accept_invite(pool: &PgPool, token: &str, actor: Uuid) -> Result<ClassroomRow> {
    let mut tx = pool.begin().await?;

    let Some(invite) =
        tokens::consume(&mut *tx, token, tokens::ActionTokenKind::ClassroomInvite).await?
    else {
        return Err(EngineError::Validation(
            "Invalid or expired invite token".into(),
        ));
    };
    let classroom_id = invite.classroom_id.ok_or_else(|| {
        EngineError::Internal("Invite token has no classroom reference".into())
    })?;

    let classroom = lock_classroom(&mut tx, classroom_id).await?;

    sqlx::query(
        "INSERT INTO classroom_members (classroom_id, user_id) VALUES ($1, $2) \
         ON CONFLICT DO NOTHING",
    )
    .bind(classroom_id)
    .bind(actor)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM join_requests WHERE classroom_id = $1 AND user_id = $2")
        .bind(classroom_id)
        .bind(actor)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(classroom)
}

/// Delete a classroom. Creator only. Semesters, CR seats, subjects,
/// documents, todos, members and requests go with it (FK cascade).
pub async fn delete_classroom(pool: &PgPool, classroom_id: Uuid, actor: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;
    let classroom = lock_classroom(&mut tx, classroom_id).await?;

    if classroom.created_by != actor {
        return Err(EngineError::Forbidden(
            "Only the classroom creator can delete it".into(),
        ));
    }

    sqlx::query("DELETE FROM classrooms WHERE id = $1")
        .bind(classroom_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// List the classrooms the actor belongs to, newest-first.
pub async fn list_classrooms(pool: &PgPool, actor: Uuid) -> Result<Vec<ClassroomSummary>> {
    let rows = sqlx::query_as::<_, ClassroomSummary>(
        "SELECT c.id, c.name, c.description, c.created_by, \
                (SELECT COUNT(*) FROM classroom_members m2 \
                 WHERE m2.classroom_id = c.id) AS member_count, \
                c.created_at \
         FROM classrooms c \
         JOIN classroom_members m ON m.classroom_id = c.id \
         WHERE m.user_id = $1 \
         ORDER BY c.created_at DESC",
    )
    .bind(actor)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch a classroom with member and pending-request detail. Member-gated;
/// the join code and request list are meant for active-semester CRs (the
/// caller's CR status is reported so the handler can redact).
pub async fn get_classroom(
    pool: &PgPool,
    classroom_id: Uuid,
    actor: Uuid,
) -> Result<ClassroomDetail> {
    let classroom = sqlx::query_as::<_, ClassroomRow>(
        "SELECT id, name, description, join_code, created_by, created_at, updated_at \
         FROM classrooms WHERE id = $1",
    )
    .bind(classroom_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| EngineError::NotFound("Classroom not found".into()))?;

    require_member(pool, classroom_id, actor).await?;

    let members = sqlx::query_as::<_, MemberInfo>(
        "SELECT u.id AS user_id, u.username, u.email, u.full_name, m.joined_at \
         FROM classroom_members m \
         JOIN users u ON u.id = m.user_id \
         WHERE m.classroom_id = $1 \
         ORDER BY m.joined_at ASC",
    )
    .bind(classroom_id)
    .fetch_all(pool)
    .await?;

    let join_requests = sqlx::query_as::<_, JoinRequestInfo>(
        "SELECT u.id AS user_id, u.username, u.email, r.requested_at \
         FROM join_requests r \
         JOIN users u ON u.id = r.user_id \
         WHERE r.classroom_id = $1 \
         ORDER BY r.requested_at ASC",
    )
    .bind(classroom_id)
    .fetch_all(pool)
    .await?;

    let is_active_cr = match super::active_semester(pool, classroom_id).await? {
        Some(active) => super::is_cr(pool, active.id, actor).await?,
        None => false,
    };

    Ok(ClassroomDetail {
        classroom,
        members,
        join_requests,
        is_active_cr,
    })
}
