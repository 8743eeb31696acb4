//! fibcache core library
//!
//! Memoizing Fibonacci engine, the session cache in front of a remote
//! key-value store, and the authenticated request flow that composes them.

pub mod context;
pub mod error;
pub mod fib;
pub mod ports;
pub mod service;
pub mod session;
pub mod storage;
mod telemetry;
#[cfg(test)]
mod test_util;

pub use context::RequestContext;
pub use error::{Result, ServiceError, StoreError, StoreResult};
pub use fib::{
    compute, CachedFib, Fibonacci, MathFib, MaxEntries, MemoTable, RetentionPolicy, TracedFib,
    Unbounded,
};
pub use ports::KvStore;
pub use service::{parse_index, FibService, DEFAULT_MAX_INDEX};
pub use session::SessionCache;
pub use storage::{MemoryStore, RedisStore};
