//! fibcache server
//!
//! Thin HTTP dispatcher over the memoized Fibonacci engine and the session
//! cache. Store backend and limits come from flags or the environment.

mod app;
mod config;
mod error;
mod extractors;
mod handlers;

use anyhow::{Context, Result};
use clap::Parser;
use fibcache_core::{
    CachedFib, FibService, KvStore, MathFib, MaxEntries, MemoTable, MemoryStore, RedisStore,
    SessionCache, TracedFib,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use app::AppState;
use config::{Config, StoreKind};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    let config = Config::parse();

    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log))
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting fibcache server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server(config).await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        "Config loaded: bind={}, store={:?}, timeout={:?}, max_n={}",
        config.bind_address,
        config.store,
        config.request_timeout(),
        config.max_n
    );

    let store = build_store(&config).await?;
    let sessions = Arc::new(SessionCache::new(store));

    let table = Arc::new(match config.memo_capacity {
        Some(capacity) => MemoTable::with_policy(MaxEntries(capacity)),
        None => MemoTable::new(),
    });
    let fib = TracedFib::new(CachedFib::new(MathFib, table));
    let service =
        Arc::new(FibService::new(Arc::new(fib), sessions).with_max_index(config.max_n));

    let state = AppState {
        service,
        request_timeout: config.request_timeout(),
        service_name: Arc::from(config.service_name.as_str()),
    };
    let app = app::router(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Listening at {}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn KvStore>> {
    match config.store {
        StoreKind::Redis => {
            info!("Connecting to Redis at {}...", config.redis_url);
            let store = RedisStore::connect(&config.redis_url, config.session_ttl())
                .await
                .context("Failed to connect to Redis")?;
            Ok(Arc::new(store))
        }
        StoreKind::Memory => {
            info!("Using in-memory session store");
            let store = MemoryStore::with_ttl(config.session_ttl());
            if config.session_ttl().is_some() {
                store.spawn_sweeper(SWEEP_INTERVAL);
            }
            Ok(Arc::new(store))
        }
    }
}
