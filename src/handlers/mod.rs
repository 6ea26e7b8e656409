//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `voice` - Inbound call webhook (entry-point speech gather)
//! - `process` - Speech-result webhook (one conversational turn)
//! - `dev` - Authenticated artifact update and rollback endpoints

pub mod api;
pub mod dev;
pub mod process;
pub mod voice;
