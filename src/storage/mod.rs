//! Storage layer for fieldlog
//!
//! JSON file storage with atomic writes for drafts, plus the local JSONL
//! audit log.

pub mod drafts;
pub mod file_io;

pub use drafts::DraftRepository;
pub use file_io::{read_json, write_json_atomic};

use crate::audit::AuditLogger;
use crate::config::paths::FieldLogPaths;
use crate::error::FieldLogError;

/// Main storage coordinator that provides access to all repositories
#[derive(Debug, Clone)]
pub struct Storage {
    paths: FieldLogPaths,
    pub drafts: DraftRepository,
    pub audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance, creating directories as needed
    pub fn new(paths: FieldLogPaths) -> Result<Self, FieldLogError> {
        paths.ensure_directories()?;

        Ok(Self {
            drafts: DraftRepository::new(paths.clone()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    pub fn paths(&self) -> &FieldLogPaths {
        &self.paths
    }

    /// Check if storage has been initialized (settings file written)
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}
