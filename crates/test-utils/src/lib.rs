//! Shared fixtures for the flowdeploy integration tests: a scripted cluster,
//! settings builders, and tracing/timeout helpers.

pub mod builders;
pub mod fake_cluster;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static TRACING: Once = Once::new();

/// How long a single deployment run may take in a test.
pub const TEST_DEADLINE: Duration = Duration::from_secs(5);

/// Route deployment logs into the test harness.
///
/// Output is captured per test and shown only when that test fails. The
/// filter comes from `FLOWDEPLOY_LOG`, then `RUST_LOG`, and otherwise keeps
/// flowdeploy's own debug lines while the HTTP stack stays at `info`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env("FLOWDEPLOY_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info,flowdeploy=debug"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `fut`, failing the test if it outlives [`TEST_DEADLINE`].
///
/// A hung driver or a fake that never answers should fail fast rather than
/// stall the suite.
pub async fn with_timeout<F, T>(fut: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_DEADLINE, fut).await {
        Ok(value) => value,
        Err(_) => panic!("deployment did not finish within {TEST_DEADLINE:?}"),
    }
}
