//! Append-only audit log
//!
//! One JSON line per applied mutation, written after the artifact overwrite
//! and before the deploy hook fires. The log has no reader in the gateway;
//! it exists for operators.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::errors::AppResult;

/// Maximum number of characters of the new source recorded in a log entry
const SUMMARY_CHARS: usize = 250;

/// A single audit record
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub timestamp: String,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

impl AuditRecord {
    pub fn update(command: &str, new_source: &str) -> Self {
        Self {
            timestamp: now_rfc3339(),
            action: "update",
            command: Some(command.to_string()),
            restored_from: None,
            summary: Some(new_source.chars().take(SUMMARY_CHARS).collect()),
        }
    }

    pub fn rollback(restored_from: &str) -> Self {
        Self {
            timestamp: now_rfc3339(),
            action: "rollback",
            command: None,
            restored_from: Some(restored_from.to_string()),
            summary: None,
        }
    }
}

/// Line-delimited JSON audit log
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one record as a single JSON line
    pub fn append(&self, record: &AuditRecord) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut line = serde_json::to_string(record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
