//! MCP tool implementations.
//!
//! Each tool delivers one platform event to the registration: a page fetch,
//! a control message, an update check, or a cache inspection.

pub mod cache;
pub mod clear;
pub mod fetch;
pub mod message;
pub mod status;
pub mod update;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::HostError;

pub use clear::clear_impl;
pub use fetch::{SwFetchParams, fetch_impl};
pub use message::{PostMessageParams, post_message_impl};
pub use status::status_impl;
pub use update::update_impl;

/// Encode a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| HostError::Output(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
