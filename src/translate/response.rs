use super::backend_types::{BackendChoice, BackendResponse};
use super::chat_types::{
    ChatCompletionResponse, Choice, ChoiceMessage, Usage, CHAT_COMPLETION_OBJECT,
};

/// Translate a buffered backend response into the caller-facing schema.
/// Pure function: `original_model` is what the caller asked for, `created` is unix seconds.
pub fn backend_to_chat(
    resp: &BackendResponse,
    original_model: &str,
    created: i64,
) -> ChatCompletionResponse {
    let choices = resp
        .choices
        .iter()
        .enumerate()
        .map(|(position, choice)| translate_choice(position, choice))
        .collect();

    let usage = resp.usage.as_ref().map_or_else(Usage::default, |u| Usage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    ChatCompletionResponse {
        id: format!("chatcmpl-{}", uuid::Uuid::new_v4().simple()),
        object: CHAT_COMPLETION_OBJECT.to_string(),
        created,
        model: original_model.to_string(),
        choices,
        usage,
    }
}

fn translate_choice(position: usize, choice: &BackendChoice) -> Choice {
    let message = choice.message.clone().unwrap_or_default();

    Choice {
        index: choice.index.unwrap_or(position as u64),
        message: ChoiceMessage {
            role: message.role.unwrap_or_else(|| "assistant".to_string()),
            content: message
                .content
                .unwrap_or_else(|| serde_json::Value::String(String::new())),
            tool_calls: message.tool_calls,
        },
        finish_reason: choice
            .finish_reason
            .clone()
            .unwrap_or_else(|| "stop".to_string()),
    }
}

/// Pull a human-readable message out of a backend error body.
///
/// Understands `{"error": {"message"}}`, `{"error": "..."}`, `{"detail": ...}`
/// and `{"message": "..."}`. Returns `None` when nothing usable is present.
pub fn backend_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let candidates = [
        value.pointer("/error/message"),
        value.get("error"),
        value.get("detail"),
        value.get("message"),
    ];

    let message = candidates.into_iter().flatten().find_map(|v| match v {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Null | serde_json::Value::Object(_) | serde_json::Value::String(_) => {
            None
        }
        // FastAPI-style validation details arrive as arrays.
        other => Some(other.to_string()),
    });
    message
}
