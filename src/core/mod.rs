//! Core components of the gateway
//!
//! - `twiml` - response markup builder for the telephony provider
//! - `llm` - chat-completion API client
//! - `dialog` - pure speech-turn classification
//! - `update` - artifact patching, backup, rollback, audit

pub mod dialog;
pub mod llm;
pub mod twiml;
pub mod update;

pub use llm::{LlmClient, LlmError};
pub use twiml::Twiml;
pub use update::{ArtifactStore, ArtifactUpdater, AuditLog};
