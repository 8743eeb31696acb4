//! Remote key-value store

use crate::error::StoreResult;
use async_trait::async_trait;

/// The three verbs the session cache needs from a store.
///
/// One call is one round trip. Implementations do not retry.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Store `value` under `key` only if the key is absent.
    async fn add(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    async fn fetch(&self, key: &str) -> StoreResult<Vec<u8>>;

    async fn delete(&self, key: &str) -> StoreResult<()>;
}
