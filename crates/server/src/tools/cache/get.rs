//! cache_get tool implementation.
//!
//! Looks up one stored entry by namespace and request identity.

use chrono::Utc;
use rmcp::ErrorData as McpError;
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::resolve;
use swcache_core::{CacheKey, CacheStore, Error, Role};
use url::Url;

use super::super::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Namespace name, e.g. `image-cache-v1.0.0`.
    pub namespace: String,

    /// Absolute URL, or a path resolved against the site origin.
    pub url: String,

    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub namespace: String,
    pub key: CacheKey,
    pub status: u16,
    pub content_type: Option<String>,
    pub body_bytes: usize,
    /// RFC 3339 capture time.
    pub captured_at: String,
    pub age_secs: i64,
    /// Within the namespace role's maximum age. Absent for unrecognised namespaces.
    pub fresh: Option<bool>,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(
    store: &dyn CacheStore, origin: &Url, params: CacheGetParams,
) -> Result<CallToolResult, McpError> {
    let url = resolve(&params.url, origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let key = CacheKey::new(&params.method, url.as_str());

    let entry = store
        .get(&params.namespace, &key)
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{key} in {}", params.namespace)))?;

    let now = Utc::now();
    let output = CacheGetOutput {
        fresh: Role::of_namespace(&params.namespace).map(|role| entry.is_fresh(role.max_age(), now)),
        status: entry.response.status,
        content_type: entry.response.content_type().map(str::to_string),
        body_bytes: entry.response.body.len(),
        captured_at: entry.captured_at.to_rfc3339(),
        age_secs: entry.age(now).num_seconds(),
        namespace: params.namespace,
        key: entry.key,
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{ORIGIN, active_registration, output};
    use swcache_core::{CacheDb, CachedEntry, Response};

    fn origin() -> Url {
        Url::parse(ORIGIN).unwrap()
    }

    fn params(namespace: &str, url: &str) -> CacheGetParams {
        CacheGetParams { namespace: namespace.into(), url: url.into(), method: default_method() }
    }

    #[tokio::test]
    async fn test_get_impl_missing() {
        let cache = CacheDb::open_in_memory().await.unwrap();

        let result = get_impl(&cache, &origin(), params("static-cache-v1", "/nope.css")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_impl_precached_entry() {
        let (_reg, store, _net) = active_registration().await;

        let out: CacheGetOutput =
            output(&get_impl(store.as_ref(), &origin(), params("static-cache-v1", "/manifest.json")).await.unwrap());

        assert_eq!(out.key.url, "https://site.example/manifest.json");
        assert_eq!(out.status, 200);
        assert_eq!(out.content_type.as_deref(), Some("text/plain"));
        assert_eq!(out.fresh, Some(true));
    }

    #[tokio::test]
    async fn test_get_impl_sqlite_unknown_namespace() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let key = CacheKey::new("GET", "https://site.example/a.txt");
        cache.put("scratch", CachedEntry::capture(key, Response::new(200, "a"))).await.unwrap();

        let out: CacheGetOutput = output(&get_impl(&cache, &origin(), params("scratch", "/a.txt")).await.unwrap());

        assert_eq!(out.body_bytes, 1);
        assert_eq!(out.fresh, None);
    }
}
