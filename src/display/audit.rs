//! Audit trail display formatting

use crate::audit::{AuditEntry, ChangeType};

use super::truncate;

/// Format audit entries as a table, oldest first
pub fn format_audit_table(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:16} {:6} {:12} {:24} {:20} {:16} {:16} {}\n",
        "When", "Type", "Entity", "Section", "Field", "Old", "New", "By"
    ));
    output.push_str(&"-".repeat(124));
    output.push('\n');

    for entry in entries {
        output.push_str(&format_audit_row(entry));
        output.push('\n');
    }

    output
}

/// One table row
pub fn format_audit_row(entry: &AuditEntry) -> String {
    let change = match entry.change_type {
        ChangeType::Edit => "edit",
        ChangeType::Create => "add",
        ChangeType::Delete => "del",
    };

    format!(
        "{} {:6} {} {} {} {} {} {}",
        entry.timestamp.format("%Y-%m-%d %H:%M"),
        change,
        truncate(&entry.entity_id, 12),
        truncate(entry.section.as_deref().unwrap_or("-"), 24),
        truncate(&entry.field_name, 20),
        truncate(entry.old_value.as_deref().unwrap_or("-"), 16),
        truncate(entry.new_value.as_deref().unwrap_or("-"), 16),
        entry.actor.display_label().unwrap_or("(unknown)")
    )
}
