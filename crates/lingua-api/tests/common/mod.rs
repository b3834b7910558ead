#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use tempfile::TempDir;
use tower::ServiceExt;

use lingua_api::{AppStateInner, JwtSettings, router};
use lingua_db::Database;
use lingua_llm::OllamaClient;

pub const SECRET: &str = "integration-test-secret";
pub const ISSUER: &str = "lingua";
pub const AUDIENCE: &str = "lingua-clients";

/// Router over a scratch database. Keep the `TempDir` alive for the test.
pub struct TestApp {
    pub router: Router,
    _dir: TempDir,
}

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: SECRET.into(),
        issuer: ISSUER.into(),
        audience: AUDIENCE.into(),
    }
}

pub fn build_app(llm_base_url: &str) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("test.db")).unwrap();
    let state = Arc::new(AppStateInner {
        db,
        jwt: jwt_settings(),
        llm: OllamaClient::new(llm_base_url),
    });

    TestApp { router: router(state), _dir: dir }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, Vec<u8>) {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn get(&self, uri: &str, bearer: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> (StatusCode, Vec<u8>) {
        self.post_json(
            "/api/auth/register",
            serde_json::json!({ "username": username, "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Vec<u8>) {
        self.post_json(
            "/api/auth/login",
            serde_json::json!({ "username": username, "password": password }),
        )
        .await
    }
}

pub fn json(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).unwrap()
}

pub fn text(body: &[u8]) -> String {
    String::from_utf8(body.to_vec()).unwrap()
}
