//! Redis-backed store
//!
//! add = `SET key value NX [EX ttl]`, fetch = `GET`, delete = `DEL`.

use crate::error::{StoreError, StoreResult};
use crate::ports::KvStore;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::RedisError;
use std::time::Duration;
use tracing::info;

pub struct RedisStore {
    conn: ConnectionManager,
    ttl: Option<Duration>,
}

impl RedisStore {
    /// Open a managed connection to `url`, e.g. `redis://127.0.0.1:6379`.
    pub async fn connect(url: &str, ttl: Option<Duration>) -> StoreResult<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(map_redis_error)?;
        info!("Connected to Redis at {}", url);
        Ok(Self { conn, ttl })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn add(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("NX");
        if let Some(ttl) = self.ttl {
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }

        let reply: Option<String> = cmd
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        match reply {
            Some(_) => Ok(()),
            None => Err(StoreError::AlreadyExists(key.to_string())),
        }
    }

    async fn fetch(&self, key: &str) -> StoreResult<Vec<u8>> {
        let mut conn = self.conn.clone();
        let reply: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        reply.ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let removed: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        if removed == 0 {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(())
    }
}

/// Transport-level failures become `Unreachable`, the rest `Other`.
pub(crate) fn map_redis_error(err: RedisError) -> StoreError {
    if err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        StoreError::Unreachable(err.to_string())
    } else {
        StoreError::Other(err.to_string())
    }
}
