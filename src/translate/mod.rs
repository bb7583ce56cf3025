//! Translation between the caller-facing chat-completions schema and the backend's.
//!
//! All translation functions are pure (no I/O). Streamed bodies are never
//! translated; see [`crate::proxy`] for the relay.

pub mod backend_types;
pub mod chat_types;
pub mod request;
pub mod response;
