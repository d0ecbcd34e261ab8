//! Integration test infrastructure for Tether.
//!
//! Provides a scripted network whose reachability can be toggled, worker
//! fixtures over the in-memory cache store, and a helper that runs the edge
//! server on an ephemeral port.
//!
//! # Usage
//!
//! ```ignore
//! use tether_tests::TestWorker;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let ctx = TestWorker::activated().await;
//!     ctx.network.set_online(false);
//!     let outcome = ctx.navigate("/").await;
//! }
//! ```

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

/// Initialize test logging (call once per test binary).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,tether_worker=debug")),
        )
        .with_test_writer()
        .try_init();
}
