//! Cache-first and network-first retrieval.
//!
//! Network errors never leave this module: a request ends with a live
//! response, a cached entry, or the synthetic offline response. Store errors
//! propagate unchanged.

use chrono::Utc;

use crate::Error;
use crate::cache::{CacheKey, CacheStore, CachedEntry};
use crate::http::{Request, Response, ResponseSource, Served};
use crate::namespace::{Namespaces, Role, Strategy};
use crate::network::Network;

/// Runs a role's strategy over one worker version's namespaces.
pub struct StrategyEngine<'a> {
    store: &'a dyn CacheStore,
    network: &'a dyn Network,
}

impl<'a> StrategyEngine<'a> {
    pub fn new(store: &'a dyn CacheStore, network: &'a dyn Network) -> Self {
        Self { store, network }
    }

    /// Serve `request` with `role`'s strategy. Responses are stored in the
    /// role's current namespace; lookups search every current namespace,
    /// the role's own first.
    pub async fn serve(&self, role: Role, namespaces: &Namespaces, request: &Request) -> Result<Served, Error> {
        match role.strategy() {
            Strategy::CacheFirst => self.cache_first(role, namespaces, request).await,
            Strategy::NetworkFirst => self.network_first(role, namespaces, request).await,
        }
    }

    /// Serve a fresh entry without touching the network; otherwise refresh
    /// from the network and fall back to whatever entry exists, stale or not.
    pub async fn cache_first(&self, role: Role, namespaces: &Namespaces, request: &Request) -> Result<Served, Error> {
        let key = CacheKey::from(request);
        let cached = self.lookup(&namespaces.lookup_order(role), &key).await?;

        if let Some(entry) = &cached
            && entry.is_fresh(role.max_age(), Utc::now())
        {
            tracing::debug!(%key, %role, "cache hit");
            return Ok(Served::new(entry.response.clone(), ResponseSource::Cache));
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                self.store_if_cacheable(&namespaces.current(role), key, &response).await?;
                Ok(Served::new(response, ResponseSource::Network))
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "network failed, falling back to cache");
                Ok(fallback(cached))
            }
        }
    }

    /// Prefer the network; consult the cache only when it fails.
    pub async fn network_first(
        &self, role: Role, namespaces: &Namespaces, request: &Request,
    ) -> Result<Served, Error> {
        let key = CacheKey::from(request);

        match self.network.fetch(request).await {
            Ok(response) => {
                self.store_if_cacheable(&namespaces.current(role), key, &response).await?;
                Ok(Served::new(response, ResponseSource::Network))
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "network failed, falling back to cache");
                let cached = self.lookup(&namespaces.lookup_order(role), &key).await?;
                Ok(fallback(cached))
            }
        }
    }

    /// First entry for `key` across `search`, in order.
    async fn lookup(&self, search: &[String], key: &CacheKey) -> Result<Option<CachedEntry>, Error> {
        for namespace in search {
            if let Some(entry) = self.store.get(namespace, key).await? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    async fn store_if_cacheable(&self, namespace: &str, key: CacheKey, response: &Response) -> Result<(), Error> {
        if !response.is_cacheable() {
            tracing::debug!(%key, status = response.status, "not caching unsuccessful response");
            return Ok(());
        }
        tracing::debug!(%key, namespace, "caching network response");
        self.store
            .put(namespace, CachedEntry::capture(key, response.clone()))
            .await
    }
}

fn fallback(cached: Option<CachedEntry>) -> Served {
    match cached {
        Some(entry) => Served::new(entry.response, ResponseSource::StaleCache),
        None => Served::new(Response::offline(), ResponseSource::Offline),
    }
}
