use std::sync::Arc;

use lingua_db::Database;
use lingua_llm::OllamaClient;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt: JwtSettings,
    pub llm: OllamaClient,
}

/// Shared HS256 secret plus the issuer/audience stamped into every token
/// and required on the way back in.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}
