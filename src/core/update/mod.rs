//! Artifact update and rollback
//!
//! Applies an externally-supplied patch to a versioned text artifact:
//! backup, model-generated rewrite, content verification, overwrite, audit
//! record, deploy-hook trigger. Rollback restores a named backup through the
//! same overwrite/audit/deploy path.
//!
//! The overwrite and the deploy hook are not transactional. A hook failure
//! after a successful overwrite leaves the artifact updated but the deploy
//! pipeline unnotified, and surfaces as a 500 to the caller.

mod audit;
mod store;

pub use audit::{AuditLog, AuditRecord};
pub use store::ArtifactStore;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::core::llm::{ChatMessage, LlmClient};
use crate::errors::{AppError, AppResult};

/// Temperature for patch-generation requests; low to keep rewrites literal
const PATCH_TEMPERATURE: f32 = 0.3;

/// Result of a successful update
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    /// Filename of the pre-update backup inside the backup directory
    pub backup: String,
}

/// Orchestrates update and rollback of the artifact
///
/// A mutex serializes mutations: two concurrent updates would otherwise race
/// on the shared artifact file and backup directory.
pub struct ArtifactUpdater {
    store: ArtifactStore,
    audit: AuditLog,
    llm: LlmClient,
    required_markers: Vec<String>,
    deploy_hook_url: Option<String>,
    http_client: Client,
    write_lock: Mutex<()>,
}

impl ArtifactUpdater {
    pub fn new(
        store: ArtifactStore,
        audit: AuditLog,
        llm: LlmClient,
        required_markers: Vec<String>,
        deploy_hook_url: Option<String>,
        timeout: Duration,
    ) -> Arc<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Arc::new(Self {
            store,
            audit,
            llm,
            required_markers,
            deploy_hook_url,
            http_client,
            write_lock: Mutex::new(()),
        })
    }

    /// Verify a generated patch before it replaces the live artifact.
    ///
    /// Marker containment is a deliberately shallow check - it catches
    /// truncated or prose-only generations, not broken code. Anything
    /// stronger (syntax check, canary deploy) belongs to the deploy
    /// pipeline behind the hook.
    pub fn validate_patch(&self, source: &str) -> AppResult<()> {
        if source.trim().is_empty() {
            return Err(AppError::Validation(
                "generated source is empty".to_string(),
            ));
        }
        for marker in &self.required_markers {
            if !source.contains(marker.as_str()) {
                return Err(AppError::Validation(format!(
                    "generated source is missing required marker '{marker}'"
                )));
            }
        }
        Ok(())
    }

    /// Apply a model-generated patch described by `command`.
    ///
    /// Order of effects: backup (before any mutation), completion request,
    /// verification, overwrite, audit record, deploy hook.
    pub async fn apply_update(&self, command: &str) -> AppResult<UpdateOutcome> {
        let _guard = self.write_lock.lock().await;

        let current_source = self.store.read()?;
        let backup = self.store.backup(&current_source)?;

        let artifact_name = self
            .store
            .artifact_path()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("the artifact")
            .to_string();

        let messages = vec![
            ChatMessage::system(format!(
                "You are a developer maintaining {artifact_name} for a voice assistant. \
                 Only return the complete, runnable contents of the file. \
                 Keep the existing framework and server startup logic intact."
            )),
            ChatMessage::user(format!("Here is the current code:\n\n{current_source}")),
            ChatMessage::user(format!("Please perform this change:\n\n{command}")),
        ];

        let new_source = self
            .llm
            .chat(messages, Some(PATCH_TEMPERATURE))
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        self.validate_patch(&new_source)?;

        self.store.write(&new_source)?;
        self.audit
            .append(&AuditRecord::update(command, &new_source))?;

        info!(%backup, "artifact updated");

        self.trigger_deploy().await?;

        Ok(UpdateOutcome { backup })
    }

    /// Restore a named backup and re-trigger deployment
    pub async fn rollback(&self, filename: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;

        let backup_source = self.store.read_backup(filename)?;
        self.store.write(&backup_source)?;
        self.audit.append(&AuditRecord::rollback(filename))?;

        info!(restored_from = %filename, "artifact rolled back");

        self.trigger_deploy().await?;

        Ok(())
    }

    /// Fire the deploy hook: a plain POST with no body and no retry
    async fn trigger_deploy(&self) -> AppResult<()> {
        let Some(url) = self.deploy_hook_url.as_deref() else {
            warn!("no deploy hook configured, skipping redeploy");
            return Ok(());
        };

        let response = self
            .http_client
            .post(url)
            .send()
            .await
            .map_err(|e| AppError::DeployHook(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::DeployHook(format!(
                "deploy hook returned {}",
                response.status()
            )));
        }

        info!("deploy hook triggered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn updater_with_markers(markers: &[&str]) -> (Arc<ArtifactUpdater>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(
            dir.path().join("artifact/index.js"),
            dir.path().join("backups"),
        );
        let audit = AuditLog::new(dir.path().join("logs/update-log.jsonl"));
        let llm = LlmClient::new(
            "http://127.0.0.1:9/v1/chat/completions".to_string(),
            Some("test-key".to_string()),
            "gpt-4".to_string(),
            Duration::from_secs(1),
        );
        let updater = ArtifactUpdater::new(
            store,
            audit,
            llm,
            markers.iter().map(|m| m.to_string()).collect(),
            None,
            Duration::from_secs(1),
        );
        (updater, dir)
    }

    #[test]
    fn test_validate_rejects_empty_source() {
        let (updater, _dir) = updater_with_markers(&[]);
        assert!(matches!(
            updater.validate_patch("  \n "),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_requires_all_markers() {
        let (updater, _dir) = updater_with_markers(&["express", "app.listen"]);
        assert!(updater
            .validate_patch("const express = require('express'); app.listen(3000);")
            .is_ok());
        assert!(matches!(
            updater.validate_patch("const express = require('express');"),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_rollback_restores_backup_contents() {
        let (updater, _dir) = updater_with_markers(&[]);
        updater.store.write("version one").unwrap();
        let backup = updater.store.backup("version one").unwrap();
        updater.store.write("version two").unwrap();

        updater.rollback(&backup).await.unwrap();
        assert_eq!(updater.store.read().unwrap(), "version one");
    }

    #[tokio::test]
    async fn test_rollback_unknown_backup_is_not_found() {
        let (updater, _dir) = updater_with_markers(&[]);
        assert!(matches!(
            updater.rollback("index-nope.js").await,
            Err(AppError::NotFound(_))
        ));
    }
}
