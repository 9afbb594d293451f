//! Core of the offline-caching worker.
//!
//! This crate provides:
//! - Versioned cache namespaces over an injectable store (SQLite or in-memory)
//! - Request classification and the cache-first / network-first strategies
//! - The worker lifecycle (install, activate, fetch, message) and registration
//! - Client notification, configuration and the unified error type

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod message;
pub mod namespace;
pub mod network;
pub mod notify;
pub mod registration;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheDb, CacheKey, CacheStore, CachedEntry, MemoryStore};
pub use classify::{Classification, Classifier};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use http::{Request, Response, ResponseSource, Served};
pub use lifecycle::{Deployment, FetchDisposition, LifecycleHandler, Phase, ServiceWorker, WorkerEnv};
pub use message::{ControlMessage, WorkerMessage};
pub use namespace::{Namespaces, Role};
pub use network::Network;
pub use notify::{ClientHandle, Clients};
pub use registration::{Registration, UpdateOutcome};
pub use strategy::StrategyEngine;
