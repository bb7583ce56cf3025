use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::models::ModelMapping;
use crate::proxy::{self, BackendClient};
use crate::translate::request::parse_chat_request;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

pub const SERVICE_NAME: &str = "completion-proxy";

/// Read-only state shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: ProxyConfig,
    pub mapping: ModelMapping,
    pub backend: BackendClient,
}

impl AppState {
    /// Validate the mapping and build the backend client from config.
    pub fn from_config(config: ProxyConfig) -> crate::Result<Self> {
        let mapping = config.model_mapping()?;
        let backend = BackendClient::from_config(&config)?;
        Ok(Self {
            config,
            mapping,
            backend,
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/v1/chat/completions",
            post(handle_chat_completions).fallback(handle_not_found),
        )
        .route("/health", get(handle_health).fallback(handle_not_found))
        .route("/v1/models", get(handle_models).fallback(handle_not_found))
        .fallback(handle_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_chat_completions(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let req = match parse_chat_request(&body) {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Rejected request");
            return e.into_response();
        }
    };

    let result = if req.is_streaming() {
        proxy::proxy_streaming(&req, &state.mapping, &state.backend)
            .await
            .map(event_stream_response)
    } else {
        proxy::proxy_buffered(&req, &state.mapping, &state.backend)
            .await
            .map(|resp| Json(resp).into_response())
    };

    result.unwrap_or_else(|e| {
        error!(error = %e, model = %req.model, "Proxy error");
        e.into_response()
    })
}

fn event_stream_response(stream: proxy::ByteStream) -> Response {
    let mut response = Response::new(Body::from_stream(stream));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    response
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "api_key_configured": state.backend.has_api_key(),
        "backend_url": state.config.backend.base_url,
    }))
}

async fn handle_models(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let created = chrono::Utc::now().timestamp();
    Json(state.mapping.descriptors(created, &state.config.backend.name))
}

async fn handle_not_found(method: Method, uri: Uri) -> Response {
    ProxyError::not_found(method.as_str(), uri.path()).into_response()
}
