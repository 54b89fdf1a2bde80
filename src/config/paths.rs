//! Path management for fieldlog
//!
//! ## Path Resolution Order
//!
//! 1. `FIELDLOG_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/fieldlog` or `~/.config/fieldlog`
//! 3. Windows: `%APPDATA%\fieldlog`

use std::path::PathBuf;

use crate::error::FieldLogError;
use crate::models::LogKind;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "FIELDLOG_DATA_DIR";

/// Manages all paths used by fieldlog
#[derive(Debug, Clone)]
pub struct FieldLogPaths {
    base_dir: PathBuf,
}

impl FieldLogPaths {
    /// Resolve paths from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home or config directory can be determined.
    pub fn new() -> Result<Self, FieldLogError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create paths rooted at a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (~/.config/fieldlog/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the directory holding one JSON file per draft
    pub fn drafts_dir(&self) -> PathBuf {
        self.data_dir().join("drafts")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the local audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path of a single draft file
    pub fn draft_file(&self, kind: LogKind, report_id: &str) -> PathBuf {
        self.drafts_dir()
            .join(format!("{}-{}.json", kind.slug(), sanitize_file_stem(report_id)))
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), FieldLogError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| FieldLogError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.drafts_dir())
            .map_err(|e| FieldLogError::Io(format!("Failed to create drafts directory: {}", e)))?;

        Ok(())
    }

    /// Check if fieldlog has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Percent-encode a report id for use as a file stem
///
/// `%` is itself encoded, so distinct report ids never share a stem.
fn sanitize_file_stem(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, FieldLogError> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg).join("fieldlog"));
    }
    let home = std::env::var("HOME")
        .map_err(|_| FieldLogError::Config("HOME environment variable not set".into()))?;
    Ok(PathBuf::from(home).join(".config").join("fieldlog"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, FieldLogError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| FieldLogError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("fieldlog"))
}
