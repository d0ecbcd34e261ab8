//! Tether Core
//!
//! Core domain types, traits, and error handling for Tether.
//! This crate has minimal dependencies and defines the shared vocabulary
//! used by the cache store, the worker engine and the edge server.

pub mod error;
pub mod events;
pub mod generation;
pub mod http;
pub mod messages;
pub mod ports;
pub mod state;

pub use error::{Error, Result};
pub use generation::CacheGeneration;
pub use http::{Method, Request, RequestKey, RequestMode, Response};
pub use state::WorkerState;
