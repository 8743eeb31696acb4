//! Session login/logout handlers

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::session_token;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use fibcache_core::ServiceError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    user: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    id: String,
    key: String,
}

/// `GET /login?user=` issues a session token for `user`.
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Result<Json<LoginResponse>, ApiError> {
    let ctx = state.request_context();
    let key = state.service.login(&ctx, &query.user).await?;
    Ok(Json(LoginResponse {
        id: query.user,
        key,
    }))
}

/// `POST /logout` revokes the token in `Authorization`.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = session_token(&headers);
    if token.is_empty() {
        return Err(ServiceError::Unauthenticated.into());
    }
    let ctx = state.request_context();
    state.service.logout(&ctx, token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::app::router;
    use crate::app::tests::{send, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn test_login_requires_user() {
        let app = router(test_state());
        let (status, _) = send(&app, Request::get("/login").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logout_without_token() {
        let app = router(test_state());
        let (status, _) = send(&app, Request::post("/logout").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
