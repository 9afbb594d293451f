//! The named-cache store seam.
//!
//! The worker never touches storage directly: every namespace operation goes
//! through [`CacheStore`], so the SQLite backend and the in-memory fake are
//! interchangeable.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::hash::compute_cache_key;
use crate::Error;
use crate::http::{Request, Response};

/// Request identity an entry is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CacheKey {
    pub method: String,
    pub url: String,
}

impl CacheKey {
    pub fn new(method: &str, url: &str) -> Self {
        Self { method: method.to_ascii_uppercase(), url: url.to_string() }
    }

    /// Content-addressed form used as the storage primary key.
    pub fn hash(&self) -> String {
        compute_cache_key(&self.method, &self.url)
    }
}

impl From<&Request> for CacheKey {
    fn from(request: &Request) -> Self {
        Self::new(&request.method, request.url.as_str())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A stored response snapshot with its explicit capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub key: CacheKey,
    pub response: Response,
    pub captured_at: DateTime<Utc>,
}

impl CachedEntry {
    /// Snapshot a response captured now.
    pub fn capture(key: CacheKey, response: Response) -> Self {
        Self { key, response, captured_at: Utc::now() }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.captured_at
    }

    /// Fresh while strictly younger than `max_age`.
    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) < max_age
    }
}

/// Process-wide set of named caches.
///
/// `put` overwrites any previous entry for the same key and creates the
/// namespace if needed. Concurrent writers to the same key are last-write-wins.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Create the namespace if it does not exist.
    async fn open(&self, namespace: &str) -> Result<(), Error>;

    /// Namespace names starting with `prefix`, sorted. An empty prefix lists all.
    async fn namespaces(&self, prefix: &str) -> Result<Vec<String>, Error>;

    /// Delete a namespace and every entry in it. Returns false if it did not exist.
    async fn delete_namespace(&self, namespace: &str) -> Result<bool, Error>;

    async fn get(&self, namespace: &str, key: &CacheKey) -> Result<Option<CachedEntry>, Error>;

    async fn put(&self, namespace: &str, entry: CachedEntry) -> Result<(), Error>;

    /// Store every entry or none of them.
    async fn put_all(&self, namespace: &str, entries: Vec<CachedEntry>) -> Result<(), Error>;

    async fn delete(&self, namespace: &str, key: &CacheKey) -> Result<bool, Error>;

    /// Keys stored in a namespace, sorted by URL. Empty if the namespace is missing.
    async fn keys(&self, namespace: &str) -> Result<Vec<CacheKey>, Error>;
}
