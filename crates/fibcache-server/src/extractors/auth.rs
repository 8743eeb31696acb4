//! Session token extraction

use axum::http::HeaderMap;

/// The `Authorization` header value, with an optional `Bearer ` prefix removed.
/// Missing or non-ASCII headers yield an empty token.
pub fn session_token(headers: &HeaderMap) -> &str {
    let raw = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .trim();
    raw.strip_prefix("Bearer ").unwrap_or(raw).trim()
}
