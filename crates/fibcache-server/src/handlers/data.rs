//! Generic write/read cache handlers

use crate::app::AppState;
use crate::error::ApiError;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
};
use fibcache_core::ServiceError;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    #[serde(default)]
    key: String,
}

impl KeyQuery {
    fn key(&self) -> Result<&str, ApiError> {
        if self.key.is_empty() {
            return Err(ServiceError::InvalidInput("key is missing".to_string()).into());
        }
        Ok(&self.key)
    }
}

pub async fn get(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Vec<u8>, ApiError> {
    let key = query.key()?;
    let ctx = state.request_context();
    let value = state.service.sessions().get(&ctx, key).await?;
    Ok(value)
}

/// Stores the request body under `key`; never overwrites.
pub async fn write(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
    body: Bytes,
) -> Result<String, ApiError> {
    let key = query.key()?;
    let ctx = state.request_context();
    state.service.sessions().save(&ctx, key, &body).await?;
    info!("Wrote {} bytes under {}", body.len(), key);
    Ok(format!("{} bytes written", body.len()))
}

pub async fn drop_key(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<StatusCode, ApiError> {
    let key = query.key()?;
    let ctx = state.request_context();
    state.service.sessions().remove(&ctx, key).await?;
    Ok(StatusCode::NO_CONTENT)
}
