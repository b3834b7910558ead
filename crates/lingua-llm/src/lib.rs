//! Client for an Ollama-compatible `/api/generate` endpoint.
//!
//! One POST per call: no timeout, retry or streaming. A non-success status
//! is folded into the returned text instead of an error.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const MODEL: &str = "llama2:13b-chat";
pub const NO_RESPONSE: &str = "No response";

const GENERATE_PATH: &str = "/api/generate";

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Connection failure, or a success status whose body was not JSON.
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    context: &'a [String],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, GENERATE_PATH)
    }

    /// Sends `prompt` with `history` and returns the model's text.
    pub async fn generate(&self, prompt: &str, history: &[String]) -> Result<String, LlmError> {
        let body = GenerateRequest {
            model: MODEL,
            prompt,
            context: history,
            stream: false,
        };

        debug!("POST {} ({} history entries)", self.endpoint(), history.len());
        let response = self.http.post(self.endpoint()).json(&body).send().await?;

        let status = response.status();
        if status.is_success() {
            let parsed: GenerateResponse = response.json().await?;
            return Ok(parsed.response.unwrap_or_else(|| NO_RESPONSE.to_string()));
        }

        let text = response.text().await.unwrap_or_default();
        warn!("LLM server returned {}: {}", status, text);
        Ok(format!("Error in Llama integration: {}", text))
    }
}
