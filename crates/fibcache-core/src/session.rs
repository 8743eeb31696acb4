//! Session cache client
//!
//! Save/Get/Drop of opaque blobs against a [`KvStore`]. Each call is exactly
//! one store round trip bounded by the request context. Failures go back to
//! the caller untouched and are also reported on the operation's span.

use crate::context::RequestContext;
use crate::error::StoreResult;
use crate::ports::KvStore;
use crate::telemetry::record_failure;
use std::sync::Arc;
use tracing::{field, info_span, Instrument};

pub struct SessionCache {
    store: Arc<dyn KvStore>,
}

impl SessionCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Add-if-absent. A second save of the same key fails with `AlreadyExists`;
    /// callers wanting upsert must `remove` first.
    pub async fn save(&self, ctx: &RequestContext, key: &str, value: &[u8]) -> StoreResult<()> {
        let span = info_span!(
            parent: ctx.span(),
            "session.save",
            key,
            bytes = value.len(),
            error = field::Empty,
            otel.status_code = field::Empty
        );
        let result = ctx
            .run(self.store.add(key, value))
            .instrument(span.clone())
            .await;
        if let Err(err) = &result {
            record_failure(&span, "save", err);
        }
        result
    }

    pub async fn get(&self, ctx: &RequestContext, key: &str) -> StoreResult<Vec<u8>> {
        let span = info_span!(
            parent: ctx.span(),
            "session.get",
            key,
            error = field::Empty,
            otel.status_code = field::Empty
        );
        let result = ctx
            .run(self.store.fetch(key))
            .instrument(span.clone())
            .await;
        if let Err(err) = &result {
            record_failure(&span, "get", err);
        }
        result
    }

    pub async fn remove(&self, ctx: &RequestContext, key: &str) -> StoreResult<()> {
        let span = info_span!(
            parent: ctx.span(),
            "session.drop",
            key,
            undeleted_key = field::Empty,
            error = field::Empty,
            otel.status_code = field::Empty
        );
        let result = ctx
            .run(self.store.delete(key))
            .instrument(span.clone())
            .await;
        if let Err(err) = &result {
            span.record("undeleted_key", key);
            tracing::warn!(parent: &span, undeleted_key = key, "Key was not deleted");
            record_failure(&span, "drop", err);
        }
        result
    }
}
