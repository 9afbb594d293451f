//! Request and response snapshots exchanged between pages, the worker and the network.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;

/// Body of the synthetic response returned when neither network nor cache can serve.
pub const OFFLINE_BODY: &str = "Offline - Content not available";

/// An intercepted resource request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Upper-cased HTTP method.
    pub method: String,
    pub url: Url,
}

impl Request {
    pub fn new(method: &str, url: Url) -> Self {
        Self { method: method.trim().to_ascii_uppercase(), url }
    }

    /// A GET request for an absolute URL.
    pub fn get(url: &str) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self::new("GET", url))
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

/// A response snapshot. Bodies are fully buffered so a response can be served
/// and stored at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, status_text: String::new(), headers: Vec::new(), body: body.into() }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// The synthetic service-unavailable response served when a request has
    /// neither a network response nor a cached fallback.
    pub fn offline() -> Self {
        Self {
            status: 503,
            status_text: "Service Unavailable".to_string(),
            headers: vec![("content-type".to_string(), "text/plain".to_string())],
            body: Bytes::from_static(OFFLINE_BODY.as_bytes()),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Only complete successful responses are persisted. Partial content is
    /// never stored.
    pub fn is_cacheable(&self) -> bool {
        (200..300).contains(&self.status) && self.status != 206
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Fresh entry served without touching the network.
    Cache,
    /// Live network response.
    Network,
    /// Cached entry served because the network failed.
    StaleCache,
    /// Synthetic 503.
    Offline,
    /// Not intercepted; handled by the default network path.
    Passthrough,
}

/// A response together with its provenance.
#[derive(Debug, Clone)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
}

impl Served {
    pub fn new(response: Response, source: ResponseSource) -> Self {
        Self { response, source }
    }
}
