//! Structured errors raised by the host adapter itself.
//!
//! Worker errors arrive as `swcache_core::Error` and convert on their own.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Errors in tool argument handling and output encoding.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Invalid tool arguments (e.g., empty URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Tool output could not be encoded.
    #[error("OUTPUT_ERROR: {0}")]
    Output(String),
}

impl From<HostError> for McpError {
    fn from(err: HostError) -> Self {
        let (code, message) = match &err {
            HostError::InvalidInput(msg) => (-32602, msg.clone()),
            HostError::Output(msg) => (-32603, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
