pub mod auth;
pub mod chat;
pub mod error;
pub mod middleware;
pub mod profile;
pub mod state;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};
use tracing::error;

pub use error::ApiError;
pub use state::{AppState, AppStateInner, JwtSettings};

/// Builds every route. Only the profile route sits behind `require_auth`.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/chat/generate", post(chat::generate))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/api/auth/profile", get(profile::profile))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Runs blocking DB/hashing work off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal
    })?
}
