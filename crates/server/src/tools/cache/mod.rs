//! Cache inspection tools.
//!
//! Read-only views into the named caches the worker maintains.

pub mod get;

pub use get::{CacheGetParams, get_impl};
