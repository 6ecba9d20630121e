//! # iaps_api
//!
//! HTTP API library for IAPS.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post};
use iaps_core::mailer::Mailer;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::handlers::{ai, auth, classrooms, documents, health, semesters, subjects, todos};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    /// Outbound email adapter.
    pub mailer: Arc<dyn Mailer>,
}

/// Run embedded database migrations.
///
/// Delegates to `iaps_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    iaps_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/auth/signup", post(auth::signup_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/refresh", post(auth::refresh_handler))
        .route("/api/auth/verify-email", post(auth::verify_email_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route("/api/auth/verify", get(auth::verify_handler))
        .route("/api/auth/logout", post(auth::logout_handler))
        .route("/api/classroom/create", post(classrooms::create_handler))
        .route(
            "/api/classroom/join/request",
            post(classrooms::request_join_handler),
        )
        .route(
            "/api/classroom/{id}/approve",
            post(classrooms::approve_join_handler),
        )
        .route(
            "/api/classroom/{id}/reject",
            post(classrooms::reject_join_handler),
        )
        .route(
            "/api/classroom/{id}/remove-member",
            post(classrooms::remove_member_handler),
        )
        .route(
            "/api/classroom/{id}/invite",
            post(classrooms::invite_handler),
        )
        .route(
            "/api/classroom/accept-invite",
            post(classrooms::accept_invite_handler),
        )
        .route("/api/classroom/list", get(classrooms::list_handler))
        .route(
            "/api/classroom/{id}",
            get(classrooms::get_handler).delete(classrooms::delete_handler),
        )
        .route("/api/semester/create", post(semesters::create_handler))
        .route(
            "/api/semester/classroom/{id}/list",
            get(semesters::list_handler),
        )
        .route(
            "/api/semester/{id}",
            get(semesters::get_handler).delete(semesters::delete_handler),
        )
        .route("/api/semester/{id}/add-cr", post(semesters::add_cr_handler))
        .route(
            "/api/semester/{id}/remove-cr",
            post(semesters::remove_cr_handler),
        )
        .route(
            "/api/semester/{id}/switch-active",
            post(semesters::switch_active_handler),
        )
        .route("/api/subject/create", post(subjects::create_handler))
        .route(
            "/api/subject/semester/{id}/list",
            get(subjects::list_handler),
        )
        .route("/api/subject/{id}", delete(subjects::delete_handler))
        .route("/api/document/upload", post(documents::upload_handler))
        .route(
            "/api/document/semester/{id}/list",
            get(documents::list_handler),
        )
        .route(
            "/api/document/{id}/toggle-ai",
            patch(documents::toggle_ai_handler),
        )
        .route("/api/document/{id}", delete(documents::delete_handler))
        .route("/api/todo/create", post(todos::create_handler))
        .route("/api/todo/semester/{id}/list", get(todos::list_handler))
        .route("/api/todo/{id}/toggle", patch(todos::toggle_handler))
        .route("/api/todo/{id}", delete(todos::delete_handler))
        .route("/api/ai/summary", post(ai::summary_handler))
        .route("/api/ai/flashcards", post(ai::flashcards_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
