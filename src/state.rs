//! Shared application state

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::llm::LlmClient;
use crate::core::update::{ArtifactStore, ArtifactUpdater, AuditLog};

/// State shared across all handlers
///
/// Built once in `main` from the loaded configuration and passed to the
/// router as axum state. The configuration itself is immutable for the
/// lifetime of the process.
pub struct AppState {
    pub config: ServerConfig,
    pub llm: LlmClient,
    pub updater: Arc<ArtifactUpdater>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let llm = LlmClient::new(
            config.completion_api_url.clone(),
            config.openai_api_key.clone(),
            config.completion_model.clone(),
            config.request_timeout(),
        );

        let store = ArtifactStore::new(config.artifact_path.clone(), config.backup_dir.clone());
        let audit = AuditLog::new(config.audit_log_path.clone());
        let updater = ArtifactUpdater::new(
            store,
            audit,
            llm.clone(),
            config.update_required_markers.clone(),
            config.deploy_hook_url.clone(),
            config.request_timeout(),
        );

        Arc::new(Self {
            config,
            llm,
            updater,
        })
    }
}
