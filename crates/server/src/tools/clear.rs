//! clear_app_cache tool implementation.
//!
//! Posts `{ "type": "CLEAR_CACHE" }` to the active worker.

use rmcp::ErrorData as McpError;
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::Registration;

use super::json_result;

/// Output from the clear_app_cache tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClearOutput {
    /// Namespaces deleted, regardless of role or version.
    pub namespaces_deleted: u64,
    /// Controlled pages sent `CACHE_CLEARED`.
    pub clients_notified: usize,
}

/// Implementation of the clear_app_cache tool.
pub async fn clear_impl(registration: &Registration) -> Result<CallToolResult, McpError> {
    let outcome = registration.clear_app_cache().await?;
    json_result(&ClearOutput {
        namespaces_deleted: outcome.namespaces_deleted,
        clients_notified: outcome.clients_notified,
    })
}
