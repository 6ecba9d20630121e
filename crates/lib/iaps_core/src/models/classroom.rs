//! Classroom domain models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Row returned by classroom queries.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClassroomRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub join_code: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Classroom list entry with an aggregate member count.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClassroomSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_by: Uuid,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A classroom member with user info for display.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MemberInfo {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub joined_at: DateTime<Utc>,
}

/// A pending join request with user info for display.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JoinRequestInfo {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub requested_at: DateTime<Utc>,
}
