//! Fibonacci handler

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::session_token;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FibQuery {
    n: Option<String>,
}

/// `GET /fib?n=` with the session token in `Authorization`.
pub async fn fib(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FibQuery>,
) -> Result<String, ApiError> {
    let ctx = state.request_context();
    let token = session_token(&headers);
    let value = state
        .service
        .authorized_fib(&ctx, token, query.n.as_deref().unwrap_or_default())
        .await?;
    Ok(value.to_string())
}
