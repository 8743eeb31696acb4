//! HTTP handlers

pub mod auth;
pub mod data;
pub mod fib;

pub async fn health() -> &'static str {
    "ok"
}
