//! JSON export of the audit trail with schema versioning

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::error::{FieldLogError, FieldLogResult};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Audit trail export document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    /// Report the export was limited to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    pub entry_count: usize,

    pub entries: Vec<AuditEntry>,
}

impl AuditExport {
    pub fn new(entries: Vec<AuditEntry>, entity_id: Option<String>) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            entity_id,
            entry_count: entries.len(),
            entries,
        }
    }

    /// Validate an export read back from disk
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }
        if self.entry_count != self.entries.len() {
            return Err(format!(
                "Entry count mismatch: header says {}, found {}",
                self.entry_count,
                self.entries.len()
            ));
        }
        Ok(())
    }
}

/// Write the export as JSON
pub fn export_audit_json<W: Write>(
    export: &AuditExport,
    writer: &mut W,
    pretty: bool,
) -> FieldLogResult<()> {
    if pretty {
        serde_json::to_writer_pretty(writer, export)
    } else {
        serde_json::to_writer(writer, export)
    }
    .map_err(|e| FieldLogError::Export(e.to_string()))
}

/// Parse and validate a JSON export
pub fn import_audit_json(json_str: &str) -> FieldLogResult<AuditExport> {
    let export: AuditExport =
        serde_json::from_str(json_str).map_err(|e| FieldLogError::Export(e.to_string()))?;
    export.validate().map_err(FieldLogError::Export)?;
    Ok(export)
}
