//! Request extractors

pub mod auth;

pub use auth::session_token;
