// src/http.rs
// Outbound HTTP client for the generative model

use std::time::Duration;

/// Connect timeout for outbound calls
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Create the outbound HTTP client.
///
/// Built once at startup and shared through the answer model; the request
/// timeout bounds every AI call since no retry is attempted.
pub fn create_client(request_timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(request_timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
        .pool_max_idle_per_host(4)
        .build()
}
