//! Authentication service — signup/login/refresh flows delegating to
//! `iaps_core::auth`.

use chrono::{Duration, Utc};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use iaps_core::auth::{queries, validate_email, validate_password};
use iaps_core::models::{TokenClaims, User};
use iaps_core::tokens;

use crate::AppState;
use crate::error::{AppError, AppResult};

/// Access token lifetime: 15 minutes.
const ACCESS_TOKEN_EXPIRY_SECS: i64 = 15 * 60;

/// Refresh token lifetime: 30 days.
const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

/// Successful auth response: token pair plus the user projection.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    pub user: User,
}

// ---------------------------------------------------------------------------
// Refresh token generation & hashing
// ---------------------------------------------------------------------------

/// Generate a cryptographically random refresh token (64 alphanumeric chars).
fn generate_refresh_token() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// SHA-256 hash a refresh token for storage.
fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Mint a token pair for a user and persist the refresh token hash.
async fn issue_token_pair(state: &AppState, user: User) -> AppResult<TokenResponse> {
    let access_token = iaps_core::auth::jwt::generate_access_token(
        user.id,
        &user.email,
        &user.username,
        state.config.jwt_secret.as_bytes(),
    )?;
    let refresh_token = generate_refresh_token();
    let token_hash = hash_refresh_token(&refresh_token);

    let expires_at = Utc::now() + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS);
    queries::store_refresh_token(&state.pool, &token_hash, user.id, expires_at).await?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        expires_in: ACCESS_TOKEN_EXPIRY_SECS,
        token_type: "Bearer".to_string(),
        user,
    })
}

// ---------------------------------------------------------------------------
// Public auth operations
// ---------------------------------------------------------------------------

/// Register a new account. The user starts unverified; a verification mail
/// is fired off without blocking the response.
pub async fn signup(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
    full_name: Option<&str>,
) -> AppResult<TokenResponse> {
    let username = username.trim();
    let email = email.trim().to_lowercase();

    if username.is_empty() {
        return Err(AppError::Validation("Username is required".into()));
    }
    if !validate_email(&email) {
        return Err(AppError::Validation("A valid email is required".into()));
    }
    validate_password(password)?;

    if queries::email_exists(&state.pool, &email).await? {
        return Err(AppError::Conflict("Email already registered".into()));
    }
    if queries::username_exists(&state.pool, username).await? {
        return Err(AppError::Conflict("Username already taken".into()));
    }

    let pw_hash = iaps_core::auth::password::hash_password(password)?;
    let user_id =
        queries::create_user(&state.pool, &email, username, full_name, &pw_hash).await?;

    let verify_token = tokens::issue_verification_token(&state.pool, user_id)
        .await
        .map_err(AppError::from)?;
    send_verification_mail(state, &email, username, &verify_token);

    info!(%user_id, email, "user registered");

    issue_token_pair(
        state,
        User {
            id: user_id,
            email,
            username: username.to_string(),
            full_name: full_name.map(|n| n.to_string()),
            verified: false,
        },
    )
    .await
}

/// Authenticate with email or username plus password.
pub async fn login(state: &AppState, identifier: &str, password: &str) -> AppResult<TokenResponse> {
    let row = queries::find_user_by_identifier(&state.pool, identifier.trim()).await?;

    // Uniform error: do not reveal whether the identifier exists.
    let (user, pw_hash) = match row {
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
        Some(r) => r,
    };

    if !iaps_core::auth::password::verify_password(password, &pw_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    issue_token_pair(state, user).await
}

/// Refresh an access token using a refresh token (single-use rotation).
pub async fn refresh(state: &AppState, refresh_token: &str) -> AppResult<TokenResponse> {
    let token_hash = hash_refresh_token(refresh_token);

    let row = queries::find_valid_refresh_token(&state.pool, &token_hash).await?;
    let (token_id, user_id) = match row {
        None => return Err(AppError::Unauthorized("Invalid refresh token".into())),
        Some(r) => r,
    };

    // Rotate: the presented token is spent either way.
    queries::revoke_refresh_token(&state.pool, token_id).await?;

    let user = queries::get_user_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    issue_token_pair(state, user).await
}

/// Logout — revoke a specific refresh token.
pub async fn logout(state: &AppState, refresh_token: Option<&str>) -> AppResult<()> {
    if let Some(token) = refresh_token {
        let token_hash = hash_refresh_token(token);
        queries::revoke_refresh_token_by_hash(&state.pool, &token_hash).await?;
    }
    Ok(())
}

/// Consume an email verification token and mark the user verified.
pub async fn verify_email(state: &AppState, token: &str) -> AppResult<User> {
    let Some(row) = tokens::consume(
        &state.pool,
        token,
        tokens::ActionTokenKind::EmailVerification,
    )
    .await
    .map_err(AppError::from)?
    else {
        return Err(AppError::Validation(
            "Invalid or expired verification token".into(),
        ));
    };

    let user_id = row
        .user_id
        .ok_or_else(|| AppError::Internal("Verification token has no user reference".into()))?;
    queries::mark_verified(&state.pool, user_id).await?;

    queries::get_user_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Current-user projection for a verified set of claims.
pub async fn me(state: &AppState, claims: &TokenClaims) -> AppResult<User> {
    queries::get_user_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

// ---------------------------------------------------------------------------
// Outbound mail (fire-and-forget)
// ---------------------------------------------------------------------------

/// Spawn the verification mail send. Failure is logged, never propagated.
fn send_verification_mail(state: &AppState, email: &str, username: &str, token: &str) {
    let mailer = state.mailer.clone();
    let verify_url = format!("{}/verify-email?token={token}", state.config.frontend_url);
    let email = email.to_string();
    let username = username.to_string();
    tokio::spawn(async move {
        if let Err(e) = mailer
            .send_verification_email(&email, &username, &verify_url)
            .await
        {
            warn!(email, error = %e, "failed to send verification email");
        }
    });
}

/// Spawn a classroom invite mail send. Failure is logged, never propagated.
pub fn send_invite_mail(
    state: &AppState,
    email: &str,
    classroom_name: &str,
    invited_by: &str,
    token: &str,
) {
    let mailer = state.mailer.clone();
    let invite_url = format!("{}/join-classroom?token={token}", state.config.frontend_url);
    let email = email.to_string();
    let classroom_name = classroom_name.to_string();
    let invited_by = invited_by.to_string();
    tokio::spawn(async move {
        if let Err(e) = mailer
            .send_invite_email(&email, &classroom_name, &invited_by, &invite_url)
            .await
        {
            warn!(email, error = %e, "failed to send classroom invite");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_tokens_are_long_and_distinct() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn refresh_token_hash_is_hex_sha256() {
        let h = hash_refresh_token("some-token");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
        // Same input, same hash
        assert_eq!(h, hash_refresh_token("some-token"));
    }
}
