//! Worker lifecycle: install, activate, fetch and message events.
//!
//! A worker moves `Parsed → Installing → Waiting → Activating → Active`.
//! A failed install leaves it `Redundant`, as does being replaced by a newer
//! version. Only an `Active` worker intercepts fetches.

use std::sync::Arc;

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use url::Url;

use crate::Error;
use crate::cache::{CacheKey, CacheStore, CachedEntry};
use crate::classify::{Classification, Classifier};
use crate::http::{Request, Served};
use crate::message::{ControlMessage, WorkerMessage};
use crate::namespace::{Namespaces, Role, purge_stale};
use crate::network::Network;
use crate::notify::Clients;
use crate::strategy::StrategyEngine;

/// Lifecycle phase of one worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Parsed,
    Installing,
    Waiting,
    Activating,
    Active,
    Redundant,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Parsed => "parsed",
            Phase::Installing => "installing",
            Phase::Waiting => "waiting",
            Phase::Activating => "activating",
            Phase::Active => "active",
            Phase::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Deploy-time constants of a worker version.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub version: String,
    /// The site's own origin; precache paths resolve against it.
    pub origin: Url,
    /// Root-relative paths fetched at install.
    pub precache: Vec<String>,
}

/// Collaborators shared by every worker version of a registration.
#[derive(Clone)]
pub struct WorkerEnv {
    pub store: Arc<dyn CacheStore>,
    pub network: Arc<dyn Network>,
    pub clients: Clients,
}

/// What the fetch handler decided.
#[derive(Debug, Clone)]
pub enum FetchDisposition {
    /// Not intercepted; the host performs default handling.
    PassThrough,
    Respond(Served),
}

/// Result of a completed activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub purged: u64,
    pub claimed: usize,
}

/// Result of handling a control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageOutcome {
    pub namespaces_deleted: u64,
    pub clients_notified: usize,
}

/// One handler per platform event; a host adapter binds these to its event source.
#[async_trait::async_trait]
pub trait LifecycleHandler: Send + Sync {
    /// Precache the static manifest. All-or-nothing.
    async fn install(&self) -> Result<(), Error>;

    /// Drop stale namespace generations and claim open clients.
    async fn activate(&self) -> Result<Activation, Error>;

    async fn fetch(&self, request: &Request) -> Result<FetchDisposition, Error>;

    async fn message(&self, message: ControlMessage) -> Result<MessageOutcome, Error>;
}

/// A single worker version.
pub struct ServiceWorker {
    deployment: Deployment,
    namespaces: Namespaces,
    classifier: Classifier,
    env: WorkerEnv,
    phase: RwLock<Phase>,
}

impl ServiceWorker {
    pub fn new(deployment: Deployment, env: WorkerEnv) -> Self {
        Self {
            namespaces: Namespaces::new(deployment.version.clone()),
            classifier: Classifier::new(deployment.origin.clone()),
            deployment,
            env,
            phase: RwLock::new(Phase::Parsed),
        }
    }

    pub fn version(&self) -> &str {
        &self.deployment.version
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    pub async fn phase(&self) -> Phase {
        *self.phase.read().await
    }

    /// Mark this version as replaced. It no longer intercepts anything.
    pub async fn retire(&self) {
        *self.phase.write().await = Phase::Redundant;
        tracing::info!(version = %self.deployment.version, "worker retired");
    }

    async fn transition(&self, from: Phase, to: Phase) -> Result<(), Error> {
        let mut phase = self.phase.write().await;
        if *phase != from {
            return Err(Error::InvalidState(format!(
                "worker {} cannot move to {to} from {}",
                self.deployment.version, *phase
            )));
        }
        *phase = to;
        Ok(())
    }

    /// Fetch every manifest path; any failure or unsuccessful status aborts.
    async fn fetch_manifest(&self) -> Result<Vec<CachedEntry>, Error> {
        let requests = self
            .deployment
            .precache
            .iter()
            .map(|path| {
                self.deployment
                    .origin
                    .join(path)
                    .map(|url| Request::new("GET", url))
                    .map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        try_join_all(requests.iter().map(|request| async move {
            let response = self
                .env
                .network
                .fetch(request)
                .await
                .map_err(|e| Error::InstallFailed(format!("{}: {e}", request.url)))?;
            if !response.is_cacheable() {
                return Err(Error::InstallFailed(format!("{}: status {}", request.url, response.status)));
            }
            Ok::<_, Error>(CachedEntry::capture(CacheKey::from(request), response))
        }))
        .await
    }
}

#[async_trait::async_trait]
impl LifecycleHandler for ServiceWorker {
    async fn install(&self) -> Result<(), Error> {
        self.transition(Phase::Parsed, Phase::Installing).await?;
        tracing::info!(version = %self.deployment.version, "installing");

        let static_ns = self.namespaces.current(Role::Static);
        let populated = match self.fetch_manifest().await {
            Ok(entries) => {
                let count = entries.len();
                self.env.store.put_all(&static_ns, entries).await.map(|()| count)
            }
            Err(e) => Err(e),
        };

        match populated {
            Ok(count) => {
                tracing::info!(version = %self.deployment.version, namespace = %static_ns, count, "precached static assets");
                // skip waiting: the registration activates immediately
                self.transition(Phase::Installing, Phase::Waiting).await
            }
            Err(e) => {
                tracing::warn!(version = %self.deployment.version, error = %e, "install failed");
                *self.phase.write().await = Phase::Redundant;
                Err(e)
            }
        }
    }

    async fn activate(&self) -> Result<Activation, Error> {
        self.transition(Phase::Waiting, Phase::Activating).await?;
        tracing::info!(version = %self.deployment.version, "activating");

        let purged = match purge_stale(self.env.store.as_ref(), &Role::ALL, &self.namespaces.declared()).await {
            Ok(purged) => purged,
            Err(e) => {
                *self.phase.write().await = Phase::Redundant;
                return Err(e);
            }
        };

        self.transition(Phase::Activating, Phase::Active).await?;
        let claimed = self.env.clients.claim(&self.deployment.version).await;
        tracing::info!(version = %self.deployment.version, purged, claimed, "active");

        Ok(Activation { purged, claimed })
    }

    async fn fetch(&self, request: &Request) -> Result<FetchDisposition, Error> {
        if self.phase().await != Phase::Active {
            return Ok(FetchDisposition::PassThrough);
        }

        let role = match self.classifier.classify(request) {
            Classification::Skip => {
                tracing::debug!(method = %request.method, url = %request.url, "not intercepted");
                return Ok(FetchDisposition::PassThrough);
            }
            Classification::Cache(role) => role,
        };

        let engine = StrategyEngine::new(self.env.store.as_ref(), self.env.network.as_ref());
        let served = engine.serve(role, &self.namespaces, request).await?;
        tracing::debug!(url = %request.url, %role, source = ?served.source, status = served.response.status, "served");

        Ok(FetchDisposition::Respond(served))
    }

    async fn message(&self, message: ControlMessage) -> Result<MessageOutcome, Error> {
        if self.phase().await == Phase::Redundant {
            return Err(Error::InvalidState(format!("worker {} is redundant", self.deployment.version)));
        }

        match message {
            ControlMessage::ClearCache => {
                let mut namespaces_deleted = 0;
                for name in self.env.store.namespaces("").await? {
                    if self.env.store.delete_namespace(&name).await? {
                        namespaces_deleted += 1;
                    }
                }
                let clients_notified = self.env.clients.broadcast(WorkerMessage::CacheCleared).await;
                tracing::info!(namespaces_deleted, clients_notified, "cleared all caches");

                Ok(MessageOutcome { namespaces_deleted, clients_notified })
            }
        }
    }
}
