//! Offline-first fetch interception engine.
//!
//! A [`ServiceWorker`] is driven by its host through [`WorkerEvent`]s. It
//! precaches the application shell on install, evicts stale cache
//! generations on activate, and resolves every intercepted fetch with one of
//! three strategies picked by [`classify`].
//!
//! [`WorkerEvent`]: tether_core::events::WorkerEvent

pub mod classify;
pub mod clients;
pub mod config;
pub mod lifecycle;
pub mod network;
pub mod page;
pub mod policy;
pub mod registration;
pub mod worker;

pub use classify::{RequestClass, classify};
pub use clients::{ClientId, ClientRegistry};
pub use config::WorkerConfig;
pub use lifecycle::LifecycleController;
pub use network::{HttpNetwork, OfflineNetwork};
pub use page::PageStatus;
pub use policy::{FetchPolicy, OfflinePayload};
pub use registration::Registration;
pub use worker::ServiceWorker;
