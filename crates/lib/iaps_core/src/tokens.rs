//! Single-use action tokens: email verification and classroom invites.
//!
//! Tokens are opaque random strings stored server-side with an expiry.
//! Consumption is one conditional `DELETE ... RETURNING`, so a token can be
//! redeemed at most once even under concurrent redemption — the second
//! caller sees zero rows.

use chrono::{DateTime, Duration, Utc};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use uuid::Uuid;

/// Opaque token length in characters.
const TOKEN_LEN: usize = 48;

/// Email verification tokens live for 24 hours.
const VERIFICATION_TTL_HOURS: i64 = 24;

/// Classroom invite tokens live for 7 days.
const INVITE_TTL_DAYS: i64 = 7;

/// The kinds of single-use tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTokenKind {
    EmailVerification,
    ClassroomInvite,
}

impl ActionTokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionTokenKind::EmailVerification => "email_verification",
            ActionTokenKind::ClassroomInvite => "classroom_invite",
        }
    }
}

/// Row returned when a token is consumed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActionTokenRow {
    pub token: String,
    pub token_type: String,
    pub user_id: Option<Uuid>,
    pub classroom_id: Option<Uuid>,
    pub email: Option<String>,
    pub invited_by: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Generate an opaque, unguessable token.
fn generate_token() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Issue an email verification token for a user (24 h expiry).
pub async fn issue_verification_token<'e>(
    exec: impl sqlx::PgExecutor<'e>,
    user_id: Uuid,
) -> Result<String, sqlx::Error> {
    let token = generate_token();
    sqlx::query(
        "INSERT INTO action_tokens (token, token_type, user_id, expires_at) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(&token)
    .bind(ActionTokenKind::EmailVerification.as_str())
    .bind(user_id)
    .bind(Utc::now() + Duration::hours(VERIFICATION_TTL_HOURS))
    .execute(exec)
    .await?;
    Ok(token)
}

/// Issue a classroom invite token for an email address (7-day expiry).
pub async fn issue_invite_token<'e>(
    exec: impl sqlx::PgExecutor<'e>,
    classroom_id: Uuid,
    email: &str,
    invited_by: Uuid,
) -> Result<String, sqlx::Error> {
    let token = generate_token();
    sqlx::query(
        "INSERT INTO action_tokens (token, token_type, classroom_id, email, invited_by, expires_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&token)
    .bind(ActionTokenKind::ClassroomInvite.as_str())
    .bind(classroom_id)
    .bind(email)
    .bind(invited_by)
    .bind(Utc::now() + Duration::days(INVITE_TTL_DAYS))
    .execute(exec)
    .await?;
    Ok(token)
}

/// Consume a token of the given kind.
///
/// Returns `None` if the token does not exist, is of another kind, or has
/// expired. The row is deleted either way: an expired token is consumed by
/// the expiry check itself.
pub async fn consume<'e>(
    exec: impl sqlx::PgExecutor<'e>,
    token: &str,
    kind: ActionTokenKind,
) -> Result<Option<ActionTokenRow>, sqlx::Error> {
    let row = sqlx::query_as::<_, ActionTokenRow>(
        "DELETE FROM action_tokens WHERE token = $1 AND token_type = $2 \
         RETURNING token, token_type, user_id, classroom_id, email, invited_by, \
                   expires_at, created_at",
    )
    .bind(token)
    .bind(kind.as_str())
    .fetch_optional(exec)
    .await?;

    match row {
        Some(row) if row.expires_at > Utc::now() => Ok(Some(row)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn tokens_are_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
    }

    #[test]
    fn kind_strings_are_stable() {
        assert_eq!(
            ActionTokenKind::EmailVerification.as_str(),
            "email_verification"
        );
        assert_eq!(ActionTokenKind::ClassroomInvite.as_str(), "classroom_invite");
    }
}
