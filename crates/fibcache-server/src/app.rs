//! Router and shared state

use axum::{
    routing::{delete, get, post},
    Router,
};
use fibcache_core::{FibService, RequestContext};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::handlers;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FibService>,
    pub request_timeout: Duration,
    pub service_name: Arc<str>,
}

impl AppState {
    /// Context for one request, parented to the HTTP trace span.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::new()
            .with_span(Span::current())
            .with_timeout(self.request_timeout)
    }
}

pub fn router(state: AppState) -> Router {
    let service_name = state.service_name.clone();
    Router::new()
        .route("/health", get(handlers::health))
        .route("/fib", get(handlers::fib::fib))
        .route("/get", get(handlers::data::get))
        .route("/write", post(handlers::data::write))
        .route("/drop", delete(handlers::data::drop_key))
        .route("/login", get(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .layer(
            TraceLayer::new_for_http().make_span_with(move |request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "request",
                    service = %service_name,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}
