//! Audit entry data structures
//!
//! Defines the change types, the actor metadata attached to each entry,
//! and the row format shared by the JSONL log and the Supabase table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of change recorded by an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// A field value was edited
    Edit,
    /// A repeatable-list entry was added
    Create,
    /// A repeatable-list entry was removed
    Delete,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeType::Edit => write!(f, "edit"),
            ChangeType::Create => write!(f, "create"),
            ChangeType::Delete => write!(f, "delete"),
        }
    }
}

/// Identity of whoever made a change, resolved best-effort
///
/// Every field is optional; an unresolved actor serializes as nulls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub user_role: Option<String>,
}

impl Actor {
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    /// Best label for display: name, then email, then id
    pub fn display_label(&self) -> Option<&str> {
        self.user_name
            .as_deref()
            .or(self.user_email.as_deref())
            .or(self.user_id.as_deref())
    }
}

/// A detected change, before the actor and entity context are attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field_name: String,
    pub section: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub change_type: ChangeType,
}

/// A single audit log row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,

    /// Tag of the log that produced the change (e.g. "DitchLog")
    pub entity_type: String,

    /// Report or activity block the change belongs to
    pub entity_id: String,

    pub section: Option<String>,

    /// Display name of the changed field
    pub field_name: String,

    pub old_value: Option<String>,

    pub new_value: Option<String>,

    pub change_type: ChangeType,

    #[serde(flatten)]
    pub actor: Actor,

    #[serde(rename = "created_at")]
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    /// Build an entry from a detected change, stamped now
    pub fn from_change(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        change: FieldChange,
        actor: Actor,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            section: change.section,
            field_name: change.field_name,
            old_value: change.old_value,
            new_value: change.new_value,
            change_type: change.change_type,
            actor,
            timestamp: Utc::now(),
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.change_type.to_string().to_uppercase(),
            self.entity_type,
            self.entity_id
        );

        if let Some(section) = &self.section {
            output.push_str(&format!(" / {}", section));
        }

        output.push_str(&format!(
            "\n  {}: {} -> {}",
            self.field_name,
            self.old_value.as_deref().unwrap_or("-"),
            self.new_value.as_deref().unwrap_or("-")
        ));

        if let Some(actor) = self.actor.display_label() {
            output.push_str(&format!("\n  By: {}", actor));
        }

        output
    }
}
