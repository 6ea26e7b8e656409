//! Error types for the gateway
//!
//! Split into two families, mirroring the two surfaces of the server:
//! - `app_error` - errors returned by the admin JSON endpoints
//! - `auth_error` - errors raised by the shared-secret middleware

pub mod app_error;
pub mod auth_error;

pub use app_error::{AppError, AppResult};
pub use auth_error::AuthError;
