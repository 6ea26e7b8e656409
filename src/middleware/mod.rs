//! Middleware layers

pub mod auth;

pub use auth::dev_auth_middleware;
