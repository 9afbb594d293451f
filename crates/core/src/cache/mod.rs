//! Named-cache storage.
//!
//! The worker depends only on the [`CacheStore`] trait. Two backends are
//! provided:
//!
//! - [`CacheDb`]: persistent SQLite store via tokio-rusqlite, WAL mode,
//!   versioned migrations, transactional bulk writes
//! - [`MemoryStore`]: process-local store for tests and ephemeral hosts

pub mod connection;
pub mod entries;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use memory::MemoryStore;
pub use store::{CacheKey, CacheStore, CachedEntry};
