//! Shared HTTP Client Module
//!
//! Global, lazy-initialized HTTP clients so every provider call reuses the
//! same connection pool. Per-call deadlines are set on each request, since
//! vision calls get a much larger budget than text calls.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Vision requests (image or rasterized PDF) against the local model server
pub const VISION_TIMEOUT: Duration = Duration::from_secs(180);

/// Text-only requests against the local model server
pub const TEXT_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat completions against remote OpenAI-compatible providers
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

/// Global HTTP client for model inference calls
///
/// No client-wide timeout: each request carries its own.
pub static AI_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(8)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .build()
        .expect("Failed to create AI HTTP client")
});

/// Global HTTP client for connection tests and model listing
///
/// Short timeout, these should answer immediately.
pub static VALIDATION_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(2)
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to create validation HTTP client")
});

/// Get the global inference client
#[inline]
pub fn ai_client() -> &'static Client {
    &AI_CLIENT
}

/// Get the global validation HTTP client
#[inline]
pub fn validation_client() -> &'static Client {
    &VALIDATION_CLIENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_are_created() {
        let _ = ai_client();
        let _ = validation_client();
    }

    #[test]
    fn test_clients_are_same_instance() {
        assert!(std::ptr::eq(ai_client(), ai_client()));
        assert!(std::ptr::eq(validation_client(), validation_client()));
    }
}
