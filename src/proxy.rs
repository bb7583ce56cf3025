use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result};
use crate::logging::redact_secret;
use crate::models::ModelMapping;
use crate::translate::backend_types::{BackendRequest, BackendResponse};
use crate::translate::chat_types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::translate::request::chat_to_backend;
use crate::translate::response::{backend_error_message, backend_to_chat};

use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Raw backend bytes on their way to the caller.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::result::Result<Bytes, std::io::Error>> + Send>>;

/// The configured backend endpoint plus the credential used to call it.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    /// Cap on a whole buffered exchange. Streams are only bounded per read.
    request_timeout: Option<Duration>,
}

impl BackendClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
            request_timeout: None,
        }
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the HTTP client with the configured timeouts and read the credential once.
    ///
    /// `timeout_secs` bounds a buffered exchange end to end; on a stream it
    /// only bounds the gap between reads, so long generations are not cut off.
    pub fn from_config(config: &ProxyConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.backend.timeout_secs);
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.backend.connect_timeout_secs))
            .read_timeout(timeout)
            .build()
            .map_err(|e| ProxyError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::new(client, config.completions_url(), config.resolve_api_key())
            .with_request_timeout(timeout))
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// POST the request and return the response only if the backend answered 2xx.
    async fn send(&self, body: &BackendRequest) -> Result<reqwest::Response> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ProxyError::config("Backend API key is not configured; set the configured environment variable")
        })?;

        debug!(
            url = %self.url,
            model = %body.model,
            stream = body.stream,
            api_key = %redact_secret(api_key),
            "Calling backend"
        );

        let mut request = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .json(body);
        if let (false, Some(timeout)) = (body.stream, self.request_timeout) {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProxyError::transport(format!("Request failed: {}", e.without_url())))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = backend_error_message(&text)
            .unwrap_or_else(|| format!("Backend returned status {}", status.as_u16()));

        warn!(status = status.as_u16(), body = %truncate(&text, 300), "Backend error");

        Err(ProxyError::upstream(status.as_u16(), message))
    }
}

impl fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendClient")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_deref().map(redact_secret))
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

/// Forward a buffered request and reshape the backend's answer for the caller.
pub async fn proxy_buffered(
    req: &ChatCompletionRequest,
    mapping: &ModelMapping,
    backend: &BackendClient,
) -> Result<ChatCompletionResponse> {
    let mut backend_req = chat_to_backend(req, mapping);
    backend_req.stream = false;

    info!(
        requested = %req.model,
        backend_model = %backend_req.model,
        mapped = mapping.contains(&req.model),
        messages = backend_req.messages.len(),
        "Forwarding completion"
    );

    let response = backend.send(&backend_req).await?;
    let body = response
        .bytes()
        .await
        .map_err(|e| ProxyError::transport(format!("Failed to read response body: {}", e)))?;

    let parsed: BackendResponse = serde_json::from_slice(&body).map_err(|e| {
        ProxyError::translation(format!(
            "Failed to parse backend response: {}. Body: {}",
            e,
            truncate(&String::from_utf8_lossy(&body), 300)
        ))
    })?;

    let translated = backend_to_chat(&parsed, &req.model, chrono::Utc::now().timestamp());

    info!(
        choices = translated.choices.len(),
        prompt_tokens = translated.usage.prompt_tokens,
        completion_tokens = translated.usage.completion_tokens,
        "Completed"
    );

    Ok(translated)
}

/// Forward a streaming request and hand back the backend body as an untouched byte stream.
///
/// Errors before the first byte (missing key, transport, non-2xx) are returned
/// as `Err`; once streaming has begun, failures end the stream.
pub async fn proxy_streaming(
    req: &ChatCompletionRequest,
    mapping: &ModelMapping,
    backend: &BackendClient,
) -> Result<ByteStream> {
    let mut backend_req = chat_to_backend(req, mapping);
    backend_req.stream = true;

    info!(
        requested = %req.model,
        backend_model = %backend_req.model,
        mapped = mapping.contains(&req.model),
        messages = backend_req.messages.len(),
        "Forwarding completion (streaming)"
    );

    let response = backend.send(&backend_req).await?;

    Ok(Box::pin(relay(response.bytes_stream())))
}

/// Pass chunks through one at a time. The stream is pulled by the caller's
/// connection, so nothing is read from the backend faster than it is written
/// out. Dropping the stream drops the backend response and its connection.
fn relay<E>(
    byte_stream: impl Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
) -> impl Stream<Item = std::result::Result<Bytes, std::io::Error>> + Send + 'static
where
    E: std::error::Error + Send + Sync + 'static,
{
    async_stream::stream! {
        let mut chunks = 0usize;
        let mut bytes = 0usize;
        let mut failed = false;

        tokio::pin!(byte_stream);

        while let Some(chunk_result) = byte_stream.next().await {
            match chunk_result {
                Ok(chunk) => {
                    chunks += 1;
                    bytes += chunk.len();
                    yield Ok(chunk);
                }
                Err(e) => {
                    warn!(chunks, error = %e, "Backend stream failed, aborting relay");
                    failed = true;
                    yield Err(std::io::Error::other(e));
                    break;
                }
            }
        }

        if !failed {
            info!(chunks, bytes, "Stream completed");
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
