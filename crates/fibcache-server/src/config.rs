//! Server configuration, from flags or environment

use clap::{Parser, ValueEnum};
use fibcache_core::DEFAULT_MAX_INDEX;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Redis,
    Memory,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "fibcache-server")]
#[command(author, version, about = "Memoized Fibonacci service with a session cache", long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:9090")]
    pub bind_address: String,

    /// Session store backend
    #[arg(long, env = "STORE", value_enum, default_value = "redis")]
    pub store: StoreKind,

    /// Redis connection URL
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Expire session entries after this many seconds
    #[arg(long, env = "SESSION_TTL_SECS")]
    pub session_ttl_secs: Option<u64>,

    /// Deadline for each request's store round trips
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 1000)]
    pub request_timeout_ms: u64,

    /// Stop memoizing new inputs past this many entries
    #[arg(long, env = "MEMO_CAPACITY")]
    pub memo_capacity: Option<usize>,

    /// Largest Fibonacci index a request may ask for
    #[arg(long = "max-n", env = "MAX_N", default_value_t = DEFAULT_MAX_INDEX)]
    pub max_n: u64,

    /// Service name attached to the root span
    #[arg(long, env = "SERVICE_NAME", default_value = "fibcache")]
    pub service_name: String,

    /// Log filter, e.g. `fibcache_server=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log: String,
}

impl Config {
    pub fn session_ttl(&self) -> Option<Duration> {
        self.session_ttl_secs.map(Duration::from_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["fibcache-server"]).unwrap();
        assert_eq!(config.store, StoreKind::Redis);
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
        assert_eq!(config.session_ttl(), None);
        assert_eq!(config.memo_capacity, None);
        assert_eq!(config.max_n, DEFAULT_MAX_INDEX);
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "fibcache-server",
            "--store",
            "memory",
            "--session-ttl-secs",
            "30",
            "--memo-capacity",
            "100",
            "--max-n",
            "92",
        ])
        .unwrap();
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.session_ttl(), Some(Duration::from_secs(30)));
        assert_eq!(config.memo_capacity, Some(100));
        assert_eq!(config.max_n, 92);
    }
}
