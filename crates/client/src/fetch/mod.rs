//! HTTP network implementation for the worker.
//!
//! ### Behaviour
//! - Any HTTP status is a response; only transport failures are errors
//! - Platform timeout (default 20s) surfaces as `FETCH_TIMEOUT`
//! - Max redirects: 5
//! - Bodies are fully buffered so they can be served and stored

pub mod url;

use bytes::Bytes;
use reqwest::{Client, Method, header};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, resolve};

use swcache_core::{Error, Network, Request, Response};

/// Configuration for the HTTP network.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "sw-cache/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Whether to honour HTTP(S)_PROXY from the environment (default: true)
    pub system_proxy: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "sw-cache/0.1".to_string(),
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
            system_proxy: true,
        }
    }
}

/// The real network, backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    http: Client,
}

impl HttpNetwork {
    /// Create a new network client with the given configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if !config.system_proxy {
            builder = builder.no_proxy();
        }

        let http = builder
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

fn classify_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::FetchTimeout(err.to_string()) } else { Error::Network(err.to_string()) }
}

/// Header pairs with lowercase names. Values that are not valid UTF-8 are dropped.
fn header_pairs(headers: &header::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
        .collect()
}

#[async_trait::async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("method {}: {e}", request.method)))?;

        let response = self
            .http
            .request(method, request.url.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        let headers = header_pairs(response.headers());
        let body: Bytes = response.bytes().await.map_err(classify_error)?;

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}
