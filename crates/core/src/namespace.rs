//! Versioned cache namespaces and stale-generation cleanup.
//!
//! A namespace is named `<role>-cache-<version>`. Exactly one namespace per
//! role is current; the version tag is a deploy-time constant.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::cache::CacheStore;

/// Semantic class of a cached resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Static,
    Dynamic,
    Image,
}

/// How a role's requests are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Static, Role::Dynamic, Role::Image];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Static => "static",
            Role::Dynamic => "dynamic",
            Role::Image => "image",
        }
    }

    /// Maximum entry age before a cache-first lookup treats the entry as a miss.
    pub fn max_age(&self) -> Duration {
        match self {
            Role::Static => Duration::days(365),
            Role::Dynamic => Duration::days(7),
            Role::Image => Duration::days(30),
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Role::Static | Role::Image => Strategy::CacheFirst,
            Role::Dynamic => Strategy::NetworkFirst,
        }
    }

    /// Name prefix shared by every generation of this role's namespace.
    pub fn prefix(&self) -> String {
        format!("{}-cache-", self.as_str())
    }

    /// Role whose prefix `namespace` carries, if any.
    pub fn of_namespace(namespace: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| namespace.starts_with(&role.prefix()))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The namespace names declared by one worker version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    version: String,
}

impl Namespaces {
    pub fn new(version: impl Into<String>) -> Self {
        Self { version: version.into() }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn current(&self, role: Role) -> String {
        format!("{}{}", role.prefix(), self.version)
    }

    /// Current names for every role.
    pub fn declared(&self) -> Vec<String> {
        Role::ALL.iter().map(|role| self.current(*role)).collect()
    }

    /// Current names with `role`'s own namespace first.
    pub fn lookup_order(&self, role: Role) -> Vec<String> {
        std::iter::once(role)
            .chain(Role::ALL.into_iter().filter(|other| *other != role))
            .map(|r| self.current(r))
            .collect()
    }
}

/// Delete every namespace that belongs to one of `roles` but is not in
/// `current`. Namespaces with unrecognised prefixes are left alone.
///
/// Returns the number of namespaces deleted.
pub async fn purge_stale(store: &dyn CacheStore, roles: &[Role], current: &[String]) -> Result<u64, Error> {
    let mut deleted = 0u64;

    for name in store.namespaces("").await? {
        let Some(role) = Role::of_namespace(&name) else {
            continue;
        };
        if !roles.contains(&role) || current.contains(&name) {
            continue;
        }

        tracing::info!(namespace = %name, "deleting stale cache generation");
        if store.delete_namespace(&name).await? {
            deleted += 1;
        }
    }

    Ok(deleted)
}
