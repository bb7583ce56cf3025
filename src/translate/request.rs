//! Translate caller requests into backend requests.

use super::backend_types::{BackendRequest, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use super::chat_types::ChatCompletionRequest;
use crate::error::{ProxyError, Result};
use crate::models::ModelMapping;

/// Build the backend request: swap in the mapped model and fill in defaults.
/// Pure function; messages keep their order and content.
#[must_use]
pub fn chat_to_backend(req: &ChatCompletionRequest, mapping: &ModelMapping) -> BackendRequest {
    BackendRequest {
        model: mapping.resolve(&req.model).to_string(),
        messages: req.messages.clone(),
        temperature: req.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        max_tokens: req.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        stream: req.stream.unwrap_or(false),
    }
}

/// Parse a caller body. Only shape errors are rejected; content is left to the backend.
pub fn parse_chat_request(body: &[u8]) -> Result<ChatCompletionRequest> {
    if body.is_empty() {
        return Err(ProxyError::invalid_request("Request body is empty"));
    }
    serde_json::from_slice(body)
        .map_err(|e| ProxyError::invalid_request(format!("Invalid request body: {}", e)))
}
