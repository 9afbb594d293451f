//! sw_post_message tool implementation.
//!
//! Delivers raw message data to the active worker, as a page's
//! `postMessage` would. Shapes the worker does not understand are dropped.

use rmcp::ErrorData as McpError;
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{ControlMessage, Registration};

use super::json_result;

/// Input parameters for sw_post_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PostMessageParams {
    /// Message data, e.g. `{ "type": "CLEAR_CACHE" }`.
    pub data: serde_json::Value,
}

/// Output structure for sw_post_message tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PostMessageOutput {
    /// Whether the data matched a known command.
    pub handled: bool,
    pub namespaces_deleted: u64,
    pub clients_notified: usize,
}

/// Implementation of the sw_post_message tool.
pub async fn post_message_impl(
    registration: &Registration, params: PostMessageParams,
) -> Result<CallToolResult, McpError> {
    let Some(message) = ControlMessage::parse(&params.data) else {
        tracing::debug!(data = %params.data, "ignoring unknown message");
        return json_result(&PostMessageOutput::default());
    };

    let outcome = registration.post_message(message).await?;
    json_result(&PostMessageOutput {
        handled: true,
        namespaces_deleted: outcome.namespaces_deleted,
        clients_notified: outcome.clients_notified,
    })
}
