//! sw_update tool implementation.
//!
//! Re-reads the deployed configuration and installs it when its version tag
//! differs from the active worker.

use rmcp::ErrorData as McpError;
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{AppConfig, Deployment, Registration, UpdateOutcome};

use super::json_result;
use crate::error::HostError;

/// Output structure for sw_update tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateOutput {
    /// Whether a new version took over.
    pub updated: bool,
    pub version: String,
    pub previous: Option<String>,
}

/// Implementation of the sw_update tool.
pub async fn update_impl(registration: &Registration) -> Result<CallToolResult, McpError> {
    let deployment = AppConfig::load()
        .and_then(|config| config.deployment())
        .map_err(|e| HostError::InvalidInput(e.to_string()))?;
    update_with(registration, deployment).await
}

pub(crate) async fn update_with(
    registration: &Registration, deployment: Deployment,
) -> Result<CallToolResult, McpError> {
    let requested = deployment.version.clone();
    let output = match registration.update(deployment).await? {
        UpdateOutcome::Current => UpdateOutput { updated: false, version: requested, previous: None },
        UpdateOutcome::Activated { version, previous } => UpdateOutput { updated: true, version, previous },
    };
    json_result(&output)
}
