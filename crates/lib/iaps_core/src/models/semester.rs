//! Semester session domain models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Row returned by semester queries.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SemesterRow {
    pub id: Uuid,
    pub classroom_id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// Semester with its CR list attached.
#[derive(Debug, Clone, Serialize)]
pub struct SemesterDetail {
    pub id: Uuid,
    pub classroom_id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub cr_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl SemesterDetail {
    pub fn from_row(row: SemesterRow, cr_ids: Vec<Uuid>) -> Self {
        Self {
            id: row.id,
            classroom_id: row.classroom_id,
            name: row.name,
            is_active: row.is_active,
            cr_ids,
            created_at: row.created_at,
            archived_at: row.archived_at,
        }
    }

    /// Whether the given user holds a CR seat in this semester.
    pub fn is_cr(&self, user_id: Uuid) -> bool {
        self.cr_ids.contains(&user_id)
    }
}
