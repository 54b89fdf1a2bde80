//! CSV export of the audit trail
//!
//! One row per audit entry with the actor flattened into columns, so the
//! file opens directly in a spreadsheet.

use std::io::Write;

use crate::audit::AuditEntry;
use crate::error::{FieldLogError, FieldLogResult};

const HEADER: [&str; 13] = [
    "ID",
    "Timestamp",
    "Entity Type",
    "Entity ID",
    "Section",
    "Field",
    "Old Value",
    "New Value",
    "Change",
    "User ID",
    "User Email",
    "User Name",
    "User Role",
];

/// Write audit entries as CSV
pub fn export_audit_csv<W: Write>(entries: &[AuditEntry], writer: W) -> FieldLogResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(HEADER)
        .map_err(|e| FieldLogError::Export(e.to_string()))?;

    for entry in entries {
        let id = entry.id.to_string();
        let timestamp = entry.timestamp.to_rfc3339();
        let change = entry.change_type.to_string();

        csv_writer
            .write_record([
                id.as_str(),
                timestamp.as_str(),
                entry.entity_type.as_str(),
                entry.entity_id.as_str(),
                entry.section.as_deref().unwrap_or(""),
                entry.field_name.as_str(),
                entry.old_value.as_deref().unwrap_or(""),
                entry.new_value.as_deref().unwrap_or(""),
                change.as_str(),
                entry.actor.user_id.as_deref().unwrap_or(""),
                entry.actor.user_email.as_deref().unwrap_or(""),
                entry.actor.user_name.as_deref().unwrap_or(""),
                entry.actor.user_role.as_deref().unwrap_or(""),
            ])
            .map_err(|e| FieldLogError::Export(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| FieldLogError::Export(e.to_string()))?;

    Ok(())
}
