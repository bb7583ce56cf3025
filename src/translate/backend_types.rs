//! Backend-facing types: what we send to the completion backend and what it sends back.

use super::chat_types::ChatMessage;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u64 = 2048;

// ---------------------------------------------------------------------------
// Request types (what we send TO the backend)
// ---------------------------------------------------------------------------

/// Every optional field is filled in, so the backend never applies its own defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u64,
    pub stream: bool,
}

// ---------------------------------------------------------------------------
// Response types (what we receive FROM the backend, buffered mode)
// ---------------------------------------------------------------------------

/// Only `choices` is required; a body without it is treated as malformed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendResponse {
    pub choices: Vec<BackendChoice>,
    #[serde(default)]
    pub usage: Option<BackendUsage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendChoice {
    #[serde(default)]
    pub index: Option<u64>,
    #[serde(default)]
    pub message: Option<BackendMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
    #[serde(default)]
    pub tool_calls: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}
