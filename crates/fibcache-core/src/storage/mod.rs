//! Store backends
//!
//! Redis in production, a `DashMap` for tests and single-process runs.

pub mod memory;
pub mod redis;

pub use self::redis::RedisStore;
pub use memory::MemoryStore;
