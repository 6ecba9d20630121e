//! API server configuration.

use iaps_core::auth::jwt::resolve_jwt_secret;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3200").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Base URL of the frontend, used in verification and invite links.
    pub frontend_url: String,
    /// Whether a new semester inherits the previous active semester's CR
    /// list instead of starting with only its creator.
    pub inherit_semester_crs: bool,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable              | Default                                  |
    /// |-----------------------|------------------------------------------|
    /// | `BIND_ADDR`           | `127.0.0.1:3200`                         |
    /// | `DATABASE_URL`        | `postgres://localhost:5432/iaps`         |
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file     |
    /// | `FRONTEND_URL`        | `http://localhost:5173`                  |
    /// | `SEMESTER_INHERIT_CRS`| `false`                                  |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3200".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/iaps".into()),
            jwt_secret: resolve_jwt_secret(),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            inherit_semester_crs: std::env::var("SEMESTER_INHERIT_CRS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}
