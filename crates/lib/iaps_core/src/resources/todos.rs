//! Todo operations. Any member can create and toggle; creator or CR deletes.

use sqlx::PgPool;
use uuid::Uuid;

use super::member_semester_in;
use crate::models::TodoRow;
use crate::roster::{EngineError, Result, is_cr, require_member};
use crate::uuid::uuidv7;

/// Create a todo in a semester. Any classroom member.
pub async fn create_todo(
    pool: &PgPool,
    classroom_id: Uuid,
    semester_id: Uuid,
    text: &str,
    actor: Uuid,
) -> Result<TodoRow> {
    let text = text.trim();
    if text.is_empty() {
        return Err(EngineError::Validation("Todo text is required".into()));
    }

    member_semester_in(pool, classroom_id, semester_id, actor).await?;

    let row = sqlx::query_as::<_, TodoRow>(
        "INSERT INTO todos (id, classroom_id, semester_id, text, created_by) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, classroom_id, semester_id, text, completed, created_by, \
                   created_at, updated_at",
    )
    .bind(uuidv7())
    .bind(classroom_id)
    .bind(semester_id)
    .bind(text)
    .bind(actor)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// List todos of a semester, newest-first. Member-gated.
pub async fn list_todos(pool: &PgPool, semester_id: Uuid, actor: Uuid) -> Result<Vec<TodoRow>> {
    super::member_semester(pool, semester_id, actor).await?;

    let rows = sqlx::query_as::<_, TodoRow>(
        "SELECT id, classroom_id, semester_id, text, completed, created_by, \
                created_at, updated_at \
         FROM todos WHERE semester_id = $1 \
         ORDER BY created_at DESC",
    )
    .bind(semester_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch a todo by id.
async fn fetch_todo(pool: &PgPool, todo_id: Uuid) -> Result<TodoRow> {
    sqlx::query_as::<_, TodoRow>(
        "SELECT id, classroom_id, semester_id, text, completed, created_by, \
                created_at, updated_at \
         FROM todos WHERE id = $1",
    )
    .bind(todo_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| EngineError::NotFound("Todo not found".into()))
}

/// Toggle a todo's completed flag. Any classroom member. Returns the
/// updated row.
pub async fn toggle_todo(pool: &PgPool, todo_id: Uuid, actor: Uuid) -> Result<TodoRow> {
    let todo = fetch_todo(pool, todo_id).await?;
    require_member(pool, todo.classroom_id, actor).await?;

    let row = sqlx::query_as::<_, TodoRow>(
        "UPDATE todos SET completed = NOT completed, updated_at = now() WHERE id = $1 \
         RETURNING id, classroom_id, semester_id, text, completed, created_by, \
                   created_at, updated_at",
    )
    .bind(todo_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Delete a todo. Creator or a CR of its semester.
pub async fn delete_todo(pool: &PgPool, todo_id: Uuid, actor: Uuid) -> Result<()> {
    let todo = fetch_todo(pool, todo_id).await?;

    let is_owner = todo.created_by == actor;
    if !is_owner && !is_cr(pool, todo.semester_id, actor).await? {
        return Err(EngineError::Forbidden("Permission denied".into()));
    }

    sqlx::query("DELETE FROM todos WHERE id = $1")
        .bind(todo_id)
        .execute(pool)
        .await?;
    Ok(())
}
