//! sw_status tool implementation.

use rmcp::ErrorData as McpError;
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{Phase, Registration, Role};

use super::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NamespaceStatus {
    pub name: String,
    /// Role whose prefix the name carries, if recognised.
    pub role: Option<Role>,
    pub entries: usize,
    /// Declared by the active version.
    pub current: bool,
}

/// Output structure for sw_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatusOutput {
    /// Active worker version, if any.
    pub version: Option<String>,
    pub phase: Option<Phase>,
    pub controlled_clients: usize,
    pub namespaces: Vec<NamespaceStatus>,
}

/// Implementation of the sw_status tool.
pub async fn status_impl(registration: &Registration) -> Result<CallToolResult, McpError> {
    let active = registration.active().await;
    let declared = active.as_ref().map(|w| w.namespaces().declared()).unwrap_or_default();

    let (version, phase) = match &active {
        Some(worker) => (Some(worker.version().to_string()), Some(worker.phase().await)),
        None => (None, None),
    };

    let store = registration.env().store.as_ref();
    let mut namespaces = Vec::new();
    for name in store.namespaces("").await? {
        let entries = store.keys(&name).await?.len();
        namespaces.push(NamespaceStatus {
            role: Role::of_namespace(&name),
            current: declared.contains(&name),
            entries,
            name,
        });
    }

    json_result(&StatusOutput {
        version,
        phase,
        controlled_clients: registration.clients().controlled().await.len(),
        namespaces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{active_registration, output};
    use swcache_core::{CacheStore, Clients, MemoryStore, WorkerEnv};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_status_before_registration() {
        let env = WorkerEnv {
            store: Arc::new(MemoryStore::new()),
            network: crate::tools::test_support::stub_network(),
            clients: Clients::new(),
        };
        let reg = Registration::new(env);

        let out: StatusOutput = output(&status_impl(&reg).await.unwrap());

        assert!(out.version.is_none());
        assert!(out.phase.is_none());
        assert!(out.namespaces.is_empty());
    }

    #[tokio::test]
    async fn test_status_active_worker() {
        let (reg, store, _net) = active_registration().await;
        store.open("legacy-assets").await.unwrap();
        let _page = reg.clients().connect().await;
        reg.clients().claim("v1").await;

        let out: StatusOutput = output(&status_impl(&reg).await.unwrap());

        assert_eq!(out.version.as_deref(), Some("v1"));
        assert_eq!(out.phase, Some(Phase::Active));
        assert_eq!(out.controlled_clients, 1);

        let static_ns = out.namespaces.iter().find(|ns| ns.name == "static-cache-v1").unwrap();
        assert_eq!(static_ns.role, Some(Role::Static));
        assert_eq!(static_ns.entries, 2);
        assert!(static_ns.current);

        let legacy = out.namespaces.iter().find(|ns| ns.name == "legacy-assets").unwrap();
        assert_eq!(legacy.role, None);
        assert!(!legacy.current);
    }
}
