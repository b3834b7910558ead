use axum::{Json, extract::State};
use tracing::error;

use lingua_types::api::{ChatRequest, ChatResponse};

use crate::{ApiError, AppState};

/// Relays the prompt and history to the LLM server. An error status from the
/// LLM still answers 200, with the failure described in `response`.
pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let history = req.conversation_history.unwrap_or_default();
    let response = state
        .llm
        .generate(&req.prompt, &history)
        .await
        .map_err(|e| {
            error!("{}", e);
            ApiError::BadGateway
        })?;

    Ok(Json(ChatResponse { response }))
}
