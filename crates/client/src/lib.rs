//! Client code for sw-cache.
//!
//! This crate provides the production network used by the worker and the
//! URL resolution shared by hosts.

pub mod fetch;

pub use fetch::{FetchConfig, HttpNetwork, UrlError, resolve};
