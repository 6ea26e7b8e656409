//! Versioned artifact storage
//!
//! The updater operates on a configured text artifact, never on the running
//! process's own binary. Every mutation is preceded by a timestamped backup
//! into the backup directory; backups are never pruned automatically.

use std::fs;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use crate::errors::{AppError, AppResult};

/// Filesystem store for the live artifact and its backups
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    artifact_path: PathBuf,
    backup_dir: PathBuf,
}

/// Backup filenames must be plain names inside the backup directory
fn is_valid_backup_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
}

/// Filesystem-safe timestamp derived from RFC3339 by mapping `:` and `.`
/// to `-`, e.g. `2026-08-27T12-30-05Z`
fn backup_timestamp() -> String {
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());
    now.replace([':', '.'], "-")
}

impl ArtifactStore {
    pub fn new(artifact_path: PathBuf, backup_dir: PathBuf) -> Self {
        Self {
            artifact_path,
            backup_dir,
        }
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Read the live artifact
    pub fn read(&self) -> AppResult<String> {
        fs::read_to_string(&self.artifact_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!(
                    "artifact not found: {}",
                    self.artifact_path.display()
                ))
            } else {
                AppError::Io(e)
            }
        })
    }

    /// Overwrite the live artifact
    pub fn write(&self, contents: &str) -> AppResult<()> {
        if let Some(parent) = self.artifact_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.artifact_path, contents)?;
        Ok(())
    }

    /// Write a timestamped backup of the given contents and return the
    /// backup filename. Called before any mutation of the live artifact.
    pub fn backup(&self, contents: &str) -> AppResult<String> {
        fs::create_dir_all(&self.backup_dir)?;

        let stem = self
            .artifact_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("artifact");
        let extension = self
            .artifact_path
            .extension()
            .and_then(|s| s.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();

        let filename = format!("{stem}-{}{extension}", backup_timestamp());
        let backup_path = self.backup_dir.join(&filename);
        fs::write(&backup_path, contents)?;

        info!(backup = %backup_path.display(), "artifact backed up");
        Ok(filename)
    }

    /// Read a named backup, rejecting path traversal and unknown files
    pub fn read_backup(&self, filename: &str) -> AppResult<String> {
        if !is_valid_backup_filename(filename) {
            return Err(AppError::BadRequest(format!(
                "invalid backup filename: '{filename}'"
            )));
        }

        let backup_path = self.backup_dir.join(filename);
        fs::read_to_string(&backup_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("backup not found: {filename}"))
            } else {
                AppError::Io(e)
            }
        })
    }
}
