//! Cross-context message shapes.
//!
//! Pages send `{ "type": "CLEAR_CACHE" }`; the worker answers every
//! controlled page with `{ "type": "CACHE_CLEARED" }`.

use serde::{Deserialize, Serialize};

/// Page → worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    ClearCache,
}

impl ControlMessage {
    /// Parse arbitrary message data. Anything that is not a known command is
    /// ignored by the worker, so unknown shapes yield `None` rather than an error.
    pub fn parse(data: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(data.clone()).ok()
    }
}

/// Worker → page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    CacheCleared,
}
