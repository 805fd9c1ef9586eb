use reqwest::Client;
use std::time::Duration;

/// Shared client for generation and moderation calls.
///
/// `max_idle` should track the pipeline's concurrency so a full wave of
/// section requests can reuse pooled connections.
pub fn build_provider_client(timeout_secs: u64, max_idle: usize) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(max_idle.max(1))
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}
