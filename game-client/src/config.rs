use std::env;
use std::str::FromStr;
use std::time::Duration;

use game_core::DEFAULT_MAX_POLL_ITERATIONS;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: String,
    pub poll_interval_ms: u64,
    pub max_poll_iterations: u32,
    pub request_timeout_seconds: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            server_url: env::var("SERVER_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
            poll_interval_ms: env_or("POLL_INTERVAL_MS", 1000),
            max_poll_iterations: env_or("MAX_POLL_ITERATIONS", DEFAULT_MAX_POLL_ITERATIONS),
            request_timeout_seconds: env_or("REQUEST_TIMEOUT_SECONDS", 10),
        }
    }

    /// Poll period, never shorter than one millisecond.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}={}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
