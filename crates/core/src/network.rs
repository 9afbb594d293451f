//! The network seam.

use crate::Error;
use crate::http::{Request, Response};

/// Performs a real request.
///
/// `Err` means no response was produced at all (connection refused, DNS
/// failure, platform timeout). HTTP error statuses are `Ok` responses.
#[async_trait::async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}
