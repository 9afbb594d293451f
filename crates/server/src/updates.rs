//! Background tasks standing in for the registering page.
//!
//! The page checks for a new worker version on a fixed interval and logs
//! when the worker reports its caches were cleared.

use std::sync::Arc;
use std::time::Duration;

use swcache_core::{AppConfig, ClientHandle, ConfigError, Deployment, Registration, UpdateOutcome, WorkerMessage};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Run one update check with the given deployment source.
///
/// Load and install failures are logged; the active worker stays in charge.
pub async fn check_for_update_with<F>(registration: &Registration, load: F) -> Option<UpdateOutcome>
where
    F: FnOnce() -> Result<Deployment, ConfigError>,
{
    let deployment = match load() {
        Ok(deployment) => deployment,
        Err(e) => {
            tracing::warn!(error = %e, "update check skipped: configuration unavailable");
            return None;
        }
    };

    match registration.update(deployment).await {
        Ok(outcome) => {
            if let UpdateOutcome::Activated { version, previous } = &outcome {
                tracing::info!(%version, ?previous, "update check installed a new worker");
            }
            Some(outcome)
        }
        Err(e) => {
            tracing::warn!(error = %e, "update check failed");
            None
        }
    }
}

/// Check for a new version every `interval`, starting one interval from now.
pub fn spawn_update_checks(registration: Arc<Registration>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            check_for_update_with(&registration, || AppConfig::load().and_then(|c| c.deployment())).await;
        }
    })
}

/// Drain a page's message channel, logging what the worker sends.
pub fn spawn_page_listener(mut page: ClientHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = page.rx.recv().await {
            match message {
                WorkerMessage::CacheCleared => tracing::info!(client = page.id, "Cache cleared"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{active_registration, deployment};

    #[tokio::test]
    async fn test_check_installs_new_version() {
        let (reg, _store, _net) = active_registration().await;

        let outcome = check_for_update_with(&reg, || Ok(deployment("v2"))).await;

        assert_eq!(outcome, Some(UpdateOutcome::Activated { version: "v2".into(), previous: Some("v1".into()) }));
    }

    #[tokio::test]
    async fn test_check_unchanged_version() {
        let (reg, _store, _net) = active_registration().await;

        let outcome = check_for_update_with(&reg, || Ok(deployment("v1"))).await;

        assert_eq!(outcome, Some(UpdateOutcome::Current));
    }

    #[tokio::test]
    async fn test_check_bad_config_keeps_worker() {
        let (reg, _store, _net) = active_registration().await;

        let outcome = check_for_update_with(&reg, || {
            Err(ConfigError::Missing { field: "cache_version".into(), hint: "set SW_CACHE_CACHE_VERSION".into() })
        })
        .await;

        assert!(outcome.is_none());
        assert_eq!(reg.active().await.unwrap().version(), "v1");
    }

    #[tokio::test]
    async fn test_page_listener_stops_on_disconnect() {
        let (reg, _store, _net) = active_registration().await;
        let page = reg.clients().connect().await;
        let id = page.id;
        let handle = spawn_page_listener(page);

        reg.clients().disconnect(id).await;

        handle.await.unwrap();
    }
}
