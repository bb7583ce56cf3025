//! Caller-facing model names and the backend models they resolve to.

use crate::error::{ProxyError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `object` tag on each model descriptor.
pub const MODEL_OBJECT: &str = "model";

/// Ordered, immutable lookup table from caller model names to backend model names.
///
/// Order is the insertion order from configuration, which is also the order
/// `/v1/models` lists them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMapping {
    entries: IndexMap<String, String>,
    default_key: String,
}

impl ModelMapping {
    /// Build a mapping, rejecting a default key that is not itself mapped.
    pub fn new(entries: IndexMap<String, String>, default_key: impl Into<String>) -> Result<Self> {
        let default_key = default_key.into();
        if entries.is_empty() {
            return Err(ProxyError::config("Model mapping must contain at least one entry"));
        }
        if !entries.contains_key(&default_key) {
            return Err(ProxyError::config(format!(
                "Default model '{}' is not a key in the model mapping",
                default_key
            )));
        }
        Ok(Self {
            entries,
            default_key,
        })
    }

    /// Backend model for `requested`; unknown names resolve through the default entry.
    #[must_use]
    pub fn resolve(&self, requested: &str) -> &str {
        self.entries
            .get(requested)
            .unwrap_or_else(|| &self.entries[&self.default_key])
    }

    #[must_use]
    pub fn contains(&self, requested: &str) -> bool {
        self.entries.contains_key(requested)
    }

    #[must_use]
    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    pub fn caller_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One descriptor per mapping entry, stamped with `created`.
    #[must_use]
    pub fn descriptors(&self, created: i64, owned_by: &str) -> ModelList {
        let data = self
            .caller_names()
            .map(|id| ModelDescriptor {
                id: id.to_string(),
                object: MODEL_OBJECT.to_string(),
                created,
                owned_by: owned_by.to_string(),
            })
            .collect();

        ModelList {
            object: "list".to_string(),
            data,
        }
    }
}

/// Built-in table used when no `[models]` section is configured.
#[must_use]
pub fn builtin_model_table() -> IndexMap<String, String> {
    [
        ("gpt-3.5-turbo", "deepseek-chat"),
        ("gpt-4", "deepseek-chat"),
        ("gpt-4-turbo", "deepseek-chat"),
        ("gpt-4o", "deepseek-chat"),
        ("gpt-4o-mini", "deepseek-chat"),
        ("o1", "deepseek-reasoner"),
        ("o1-mini", "deepseek-reasoner"),
    ]
    .into_iter()
    .map(|(caller, backend)| (caller.to_string(), backend.to_string()))
    .collect()
}

pub const BUILTIN_DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<ModelDescriptor>,
}
