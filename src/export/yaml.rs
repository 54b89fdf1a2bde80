//! YAML export of the audit trail for human review

use std::io::Write;

use crate::error::{FieldLogError, FieldLogResult};
use crate::export::json::AuditExport;

/// Write the export as YAML with a comment header
pub fn export_audit_yaml<W: Write>(export: &AuditExport, writer: &mut W) -> FieldLogResult<()> {
    let header = format!(
        "# fieldlog audit trail export\n# Generated: {}\n# App Version: {}\n# Entries: {}\n\n",
        export.exported_at, export.app_version, export.entry_count
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| FieldLogError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, export).map_err(|e| FieldLogError::Export(e.to_string()))?;

    Ok(())
}
