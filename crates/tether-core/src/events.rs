//! Events delivered to the worker and the outcomes it reports back.

use crate::http::{Request, Response};
use crate::messages::ClientMessage;
use crate::state::WorkerState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything the host environment can deliver to a worker.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(Request),
    Message(ClientMessage),
}

impl WorkerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerEvent::Install => "install",
            WorkerEvent::Activate => "activate",
            WorkerEvent::Fetch(_) => "fetch",
            WorkerEvent::Message(_) => "message",
        }
    }
}

/// Which branch of the fetch decision tree handled a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// Not intercepted; went straight to the network.
    Passthrough,
    /// Navigation: network first, cache then offline page as fallback.
    NetworkFirst,
    /// API: network first, cache then offline JSON placeholder as fallback.
    NetworkFirstJson,
    /// Static asset: cache first, network on miss.
    CacheFirst,
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchStrategy::Passthrough => "passthrough",
            FetchStrategy::NetworkFirst => "network_first",
            FetchStrategy::NetworkFirstJson => "network_first_json",
            FetchStrategy::CacheFirst => "cache_first",
        };
        f.write_str(s)
    }
}

/// Where the returned response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
    /// The precached offline page.
    OfflinePage,
    /// A response built by the worker itself.
    Synthesized,
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
            ResponseSource::OfflinePage => "offline_page",
            ResponseSource::Synthesized => "synthesized",
        };
        f.write_str(s)
    }
}

/// A resolved fetch.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub strategy: FetchStrategy,
    pub source: ResponseSource,
    pub response: Response,
}

/// Result of dispatching one [`WorkerEvent`].
#[derive(Debug, Clone)]
pub enum EventOutcome {
    /// A lifecycle transition finished; carries the resulting state.
    Lifecycle(WorkerState),
    Fetch(FetchOutcome),
    /// Message handled; carries the state after handling.
    Message(WorkerState),
}

impl EventOutcome {
    pub fn into_fetch(self) -> Option<FetchOutcome> {
        match self {
            EventOutcome::Fetch(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn state(&self) -> Option<WorkerState> {
        match self {
            EventOutcome::Lifecycle(state) | EventOutcome::Message(state) => Some(*state),
            EventOutcome::Fetch(_) => None,
        }
    }
}
