//! Shared harness for integration tests: ephemeral PostgreSQL, migrations,
//! a router, and small request helpers.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use iaps_api::{AppState, config::ApiConfig};
use iaps_core::db::LocalDbManager;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    db: LocalDbManager,
    pub pool: sqlx::PgPool,
    pub app: Router,
}

impl TestApp {
    /// Spin up an ephemeral PostgreSQL instance, run migrations and build
    /// the router.
    pub async fn spawn() -> Self {
        Self::spawn_with(|config| config).await
    }

    /// Like [`TestApp::spawn`], with a hook to adjust the configuration.
    pub async fn spawn_with(tweak: impl FnOnce(ApiConfig) -> ApiConfig) -> Self {
        let mut db = LocalDbManager::ephemeral()
            .await
            .expect("LocalDbManager::ephemeral");
        db.setup().await.expect("db setup");
        db.start().await.expect("db start");

        let pool = sqlx::PgPool::connect(&db.connection_url())
            .await
            .expect("connect to ephemeral PG");
        iaps_api::migrate(&pool).await.expect("run migrations");

        let config = tweak(ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            database_url: db.connection_url(),
            jwt_secret: "test-secret".into(),
            frontend_url: "http://localhost:5173".into(),
            inherit_semester_crs: false,
        });

        let state = AppState {
            pool: pool.clone(),
            config,
            mailer: Arc::new(iaps_core::mailer::LogMailer),
        };
        let app = iaps_api::router(state);

        Self { db, pool, app }
    }

    /// Drive one request through the router and decode the JSON body.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = self.app.clone().oneshot(request).await.expect("request");
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("parse JSON body")
        };
        (status, json)
    }

    /// Register a user, returning (access token, user id).
    pub async fn signup(&self, username: &str, email: &str) -> (String, Uuid) {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/signup",
                None,
                Some(serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": "Passw0rdOk",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        let token = body["access_token"].as_str().expect("access_token").into();
        let id = body["user"]["id"]
            .as_str()
            .expect("user id")
            .parse()
            .expect("uuid");
        (token, id)
    }

    /// Create a classroom, returning (classroom id, initial semester id, join code).
    pub async fn create_classroom(&self, token: &str, name: &str) -> (Uuid, Uuid, String) {
        let (status, body) = self
            .request(
                "POST",
                "/api/classroom/create",
                Some(token),
                Some(serde_json::json!({"name": name})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create classroom: {body}");
        let classroom_id = body["classroom"]["id"].as_str().unwrap().parse().unwrap();
        let semester_id = body["semester"]["id"].as_str().unwrap().parse().unwrap();
        let join_code = body["classroom"]["join_code"].as_str().unwrap().to_string();
        (classroom_id, semester_id, join_code)
    }

    /// Join flow: request with the code as `member`, approve as `cr`.
    pub async fn join_and_approve(
        &self,
        classroom_id: Uuid,
        join_code: &str,
        member_token: &str,
        member_id: Uuid,
        cr_token: &str,
    ) {
        let (status, body) = self
            .request(
                "POST",
                "/api/classroom/join/request",
                Some(member_token),
                Some(serde_json::json!({"join_code": join_code})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "join request: {body}");

        let (status, body) = self
            .request(
                "POST",
                &format!("/api/classroom/{classroom_id}/approve"),
                Some(cr_token),
                Some(serde_json::json!({"user_id": member_id})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "approve: {body}");
    }

    /// Stop the embedded PostgreSQL instance.
    pub async fn teardown(mut self) {
        self.db.stop().await.expect("db stop");
    }
}
