//! Request classification for the fetch policy.

use crate::config::WorkerConfig;
use std::fmt;
use tether_core::Request;

/// How an intercepted request is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Non-GET: handed to the network untouched.
    Passthrough,
    /// Full-page load.
    Navigation,
    /// Under the API prefix.
    Api,
    /// Everything else.
    Asset,
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestClass::Passthrough => "passthrough",
            RequestClass::Navigation => "navigation",
            RequestClass::Api => "api",
            RequestClass::Asset => "asset",
        };
        f.write_str(s)
    }
}

/// Classify a request. Predicates are checked in order: method, navigation, API prefix.
pub fn classify(config: &WorkerConfig, request: &Request) -> RequestClass {
    if !request.method.is_cacheable() {
        RequestClass::Passthrough
    } else if request.is_navigation() {
        RequestClass::Navigation
    } else if config.is_api(&request.url) {
        RequestClass::Api
    } else {
        RequestClass::Asset
    }
}
