//! Worker registration at the site root scope.
//!
//! Tracks which worker version is active, installs and activates new versions
//! when the deployed version tag changes, and routes page traffic to the
//! active worker.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::Error;
use crate::http::{Request, ResponseSource, Served};
use crate::lifecycle::{Deployment, FetchDisposition, LifecycleHandler, MessageOutcome, ServiceWorker, WorkerEnv};
use crate::message::ControlMessage;
use crate::notify::Clients;

/// Outcome of an update check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The deployed version is already active.
    Current,
    /// A new version was installed and took over.
    Activated { version: String, previous: Option<String> },
}

/// A registration owning the active worker version.
pub struct Registration {
    env: WorkerEnv,
    active: RwLock<Option<Arc<ServiceWorker>>>,
    /// Serialises install/activate so two updates never race.
    updating: Mutex<()>,
}

impl Registration {
    pub fn new(env: WorkerEnv) -> Self {
        Self { env, active: RwLock::new(None), updating: Mutex::new(()) }
    }

    pub fn clients(&self) -> &Clients {
        &self.env.clients
    }

    pub fn env(&self) -> &WorkerEnv {
        &self.env
    }

    pub async fn active(&self) -> Option<Arc<ServiceWorker>> {
        self.active.read().await.clone()
    }

    /// Register the first version. Same as [`Registration::update`].
    pub async fn register(&self, deployment: Deployment) -> Result<UpdateOutcome, Error> {
        self.update(deployment).await
    }

    /// Install and activate `deployment` unless its version is already active.
    ///
    /// Install is skip-waiting: a successful install activates immediately
    /// and the previous version becomes redundant. A failed install leaves the
    /// previous version in charge.
    pub async fn update(&self, deployment: Deployment) -> Result<UpdateOutcome, Error> {
        let _guard = self.updating.lock().await;

        let previous = self.active().await;
        if let Some(current) = &previous
            && current.version() == deployment.version
        {
            tracing::debug!(version = %deployment.version, "worker up to date");
            return Ok(UpdateOutcome::Current);
        }

        let version = deployment.version.clone();
        let worker = Arc::new(ServiceWorker::new(deployment, self.env.clone()));
        worker.install().await?;
        worker.activate().await?;

        if let Some(old) = &previous {
            old.retire().await;
        }
        *self.active.write().await = Some(worker);
        tracing::info!(version = %version, previous = ?previous.as_ref().map(|w| w.version()), "new worker version active");

        Ok(UpdateOutcome::Activated { version, previous: previous.map(|w| w.version().to_string()) })
    }

    /// Route a page request: through the active worker when it intercepts,
    /// otherwise straight to the network without caching.
    pub async fn fetch(&self, request: &Request) -> Result<Served, Error> {
        if let Some(worker) = self.active().await
            && let FetchDisposition::Respond(served) = worker.fetch(request).await?
        {
            return Ok(served);
        }

        let response = self.env.network.fetch(request).await?;
        Ok(Served::new(response, ResponseSource::Passthrough))
    }

    /// Post a control message to the active worker.
    pub async fn post_message(&self, message: ControlMessage) -> Result<MessageOutcome, Error> {
        let worker = self
            .active()
            .await
            .ok_or_else(|| Error::InvalidState("no active worker to receive message".into()))?;
        worker.message(message).await
    }

    /// Developer escape hatch: ask the active worker to drop every cache.
    pub async fn clear_app_cache(&self) -> Result<MessageOutcome, Error> {
        tracing::info!("cache clear requested");
        self.post_message(ControlMessage::ClearCache).await
    }
}
