//! sw_fetch tool implementation.
//!
//! Delivers a page request to the registration and reports what was served.

use rmcp::ErrorData as McpError;
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::resolve;
use swcache_core::{Error, Registration, Request, ResponseSource};
use url::Url;

use super::json_result;
use crate::error::HostError;

/// Input parameters for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path resolved against the site origin.
    pub url: String,

    /// HTTP method (default: GET). Non-GET requests are never intercepted.
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HeaderPair {
    pub name: String,
    pub value: String,
}

/// Output structure for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    /// The resolved request URL.
    pub url: String,
    pub method: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<HeaderPair>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
    /// Where the response came from.
    pub source: ResponseSource,
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(
    registration: &Registration, origin: &Url, params: SwFetchParams,
) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(HostError::InvalidInput("url cannot be empty".into()).into());
    }
    if params.method.trim().is_empty() {
        return Err(HostError::InvalidInput("method cannot be empty".into()).into());
    }

    let url = resolve(&params.url, origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let request = Request::new(&params.method, url);

    let served = registration.fetch(&request).await?;
    let response = served.response;

    let output = SwFetchOutput {
        url: request.url.to_string(),
        method: request.method,
        status: response.status,
        status_text: response.status_text,
        headers: response
            .headers
            .into_iter()
            .map(|(name, value)| HeaderPair { name, value })
            .collect(),
        body: String::from_utf8_lossy(&response.body).to_string(),
        body_bytes: response.body.len(),
        source: served.source,
    };

    json_result(&output)
}
