//! Outbound HTTP client

use std::time::Duration;

/// Default upper bound on a single outbound request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the process-wide `reqwest` client.
///
/// Construct once at startup and clone the handle; clones share the
/// connection pool.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .user_agent(concat!("recovery-dashboard/", env!("CARGO_PKG_VERSION")))
        .build()
}
