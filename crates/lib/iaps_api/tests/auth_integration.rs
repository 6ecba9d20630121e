//! Integration tests for the identity flows: signup, login, refresh
//! rotation, email verification.

mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn signup_validation_and_duplicates() {
    let app = TestApp::spawn().await;

    let (_token, _id) = app.signup("alice", "alice@example.com").await;

    // Duplicate email, case-insensitively
    let (status, body) = app
        .request(
            "POST",
            "/api/auth/signup",
            None,
            Some(serde_json::json!({
                "username": "alice2",
                "email": "ALICE@example.com",
                "password": "Passw0rdOk",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["error"], "conflict");

    // Duplicate username, case-insensitively
    let (status, _body) = app
        .request(
            "POST",
            "/api/auth/signup",
            None,
            Some(serde_json::json!({
                "username": "Alice",
                "email": "other@example.com",
                "password": "Passw0rdOk",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Weak password
    let (status, body) = app
        .request(
            "POST",
            "/api/auth/signup",
            None,
            Some(serde_json::json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "alllowercase1",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"], "validation_error");

    app.teardown().await;
}

#[tokio::test]
async fn login_accepts_email_or_username() {
    let app = TestApp::spawn().await;
    app.signup("alice", "alice@example.com").await;

    for identifier in ["alice@example.com", "alice", "ALICE"] {
        let (status, body) = app
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(serde_json::json!({
                    "identifier": identifier,
                    "password": "Passw0rdOk",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login as {identifier}: {body}");
        assert_eq!(body["user"]["username"], "alice");
    }

    // Wrong password and unknown identifier produce the same error
    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({
                "identifier": "alice",
                "password": "WrongPass1",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({
                "identifier": "nobody",
                "password": "Passw0rdOk",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    app.teardown().await;
}

#[tokio::test]
async fn refresh_tokens_rotate_and_are_single_use() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/signup",
            None,
            Some(serde_json::json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "Passw0rdOk",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let first_refresh = body["refresh_token"].as_str().unwrap().to_string();

    // Exchange for a new pair
    let (status, body) = app
        .request(
            "POST",
            "/api/auth/refresh",
            None,
            Some(serde_json::json!({"refresh_token": first_refresh})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let second_refresh = body["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(first_refresh, second_refresh);

    // The spent token is rejected
    let (status, _body) = app
        .request(
            "POST",
            "/api/auth/refresh",
            None,
            Some(serde_json::json!({"refresh_token": first_refresh})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Logout revokes the current one too
    let access = body["access_token"].as_str().unwrap().to_string();
    let (status, _body) = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(&access),
            Some(serde_json::json!({"refresh_token": second_refresh})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _body) = app
        .request(
            "POST",
            "/api/auth/refresh",
            None,
            Some(serde_json::json!({"refresh_token": second_refresh})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    app.teardown().await;
}

#[tokio::test]
async fn email_verification_consumes_token_once() {
    let app = TestApp::spawn().await;
    let (token, user_id) = app.signup("alice", "alice@example.com").await;

    // Signup issued exactly one verification token; read it back.
    let verify_token = sqlx::query_scalar::<_, String>(
        "SELECT token FROM action_tokens WHERE token_type = 'email_verification' AND user_id = $1",
    )
    .bind(user_id)
    .fetch_one(&app.pool)
    .await
    .expect("verification token issued at signup");

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/verify-email",
            None,
            Some(serde_json::json!({"token": verify_token})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["verified"], true);

    // The token is single-use
    let (status, _body) = app
        .request(
            "POST",
            "/api/auth/verify-email",
            None,
            Some(serde_json::json!({"token": verify_token})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // And the flag is persisted
    let (status, body) = app
        .request("GET", "/api/auth/verify", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["verified"], true);

    app.teardown().await;
}

#[tokio::test]
async fn protected_routes_require_bearer_token() {
    let app = TestApp::spawn().await;

    let (status, body) = app.request("GET", "/api/classroom/list", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _body) = app
        .request("GET", "/api/classroom/list", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Health stays public
    let (status, body) = app.request("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["db_connected"], true);

    app.teardown().await;
}
