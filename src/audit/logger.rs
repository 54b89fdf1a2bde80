//! Local append-only audit log
//!
//! The log file uses a line-delimited JSON format (JSONL) where each line
//! is one audit row. Appends go through `tokio::fs` so the writer never
//! blocks the task that dispatched it.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::entry::AuditEntry;
use super::sink::AuditSink;
use crate::error::{FieldLogError, FieldLogResult};

/// Writes audit entries to a JSONL file
#[derive(Debug, Clone)]
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append the entry as a JSON line and flush it
    pub async fn log(&self, entry: &AuditEntry) -> FieldLogResult<()> {
        let mut line = serde_json::to_string(entry)
            .map_err(|e| FieldLogError::Json(format!("Failed to serialize audit entry: {}", e)))?;
        line.push('\n');

        if let Some(parent) = self.log_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                FieldLogError::Io(format!("Failed to create audit log directory: {}", e))
            })?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .await
            .map_err(|e| FieldLogError::Io(format!("Failed to open audit log: {}", e)))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| FieldLogError::Io(format!("Failed to write audit entry: {}", e)))?;

        file.flush()
            .await
            .map_err(|e| FieldLogError::Io(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// Read all audit entries, oldest first
    pub fn read_all(&self) -> FieldLogResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| FieldLogError::Io(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                FieldLogError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
                FieldLogError::Json(format!(
                    "Failed to parse audit entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            entries.push(entry);
        }

        Ok(entries)
    }

    /// Read the most recent N entries from the log
    pub fn read_recent(&self, count: usize) -> FieldLogResult<Vec<AuditEntry>> {
        let all_entries = self.read_all()?;
        let start = all_entries.len().saturating_sub(count);
        Ok(all_entries[start..].to_vec())
    }

    /// Read every entry attributed to one report or activity
    pub fn read_for_entity(&self, entity_id: &str) -> FieldLogResult<Vec<AuditEntry>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|entry| entry.entity_id == entity_id)
            .collect())
    }

    /// Count non-empty lines without parsing them
    pub fn entry_count(&self) -> FieldLogResult<usize> {
        if !self.log_path.exists() {
            return Ok(0);
        }

        let file = File::open(&self.log_path)
            .map_err(|e| FieldLogError::Io(format!("Failed to open audit log: {}", e)))?;

        let count = BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter(|l| !l.trim().is_empty())
            .count();

        Ok(count)
    }
}

#[async_trait]
impl AuditSink for AuditLogger {
    async fn append(&self, entry: &AuditEntry) -> FieldLogResult<()> {
        self.log(entry).await
    }
}
