//! Pending-change store
//!
//! Holds the value each field had when editing began. A key is consumed
//! by the comparison at commit time whether or not anything changed, so a
//! second blur without a new focus never fires twice.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use super::entry::{ChangeType, FieldChange};
use super::format::format_for_display;

/// Identifies a tracked field across the three record shapes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackingKey {
    /// Top-level field
    Field(String),
    /// Field of a one-level nested object
    Nested { parent: String, field: String },
    /// Field inside one element of a repeatable list
    Entry { entry_id: String, field: String },
}

impl TrackingKey {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    pub fn nested(parent: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Nested {
            parent: parent.into(),
            field: field.into(),
        }
    }

    pub fn entry(entry_id: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Entry {
            entry_id: entry_id.into(),
            field: field.into(),
        }
    }

    /// The raw field name, used when no display name is supplied
    pub fn field_name(&self) -> &str {
        match self {
            Self::Field(name) => name,
            Self::Nested { field, .. } | Self::Entry { field, .. } => field,
        }
    }
}

impl fmt::Display for TrackingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{}", name),
            Self::Nested { parent, field } => write!(f, "{}.{}", parent, field),
            Self::Entry { entry_id, field } => write!(f, "{}:{}", entry_id, field),
        }
    }
}

/// Values captured at focus time, keyed by tracking key
#[derive(Debug, Default)]
pub struct PendingChanges {
    values: HashMap<String, Value>,
}

impl PendingChanges {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a value is held for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Value captured for `key` at focus time
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Number of fields currently being tracked
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no field is being tracked
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Capture `current` under `key` unless a value is already held (first focus wins)
///
/// Returns `true` when the value was recorded.
pub fn begin_tracking(store: &mut PendingChanges, key: &str, current: &Value) -> bool {
    if store.values.contains_key(key) {
        return false;
    }
    store.values.insert(key.to_string(), current.clone());
    true
}

/// Consume the value held for `key` and compare it with `new_value`
///
/// Yields an edit when the formatted values differ. The key is removed in
/// every case.
pub fn compare_and_clear(
    store: &mut PendingChanges,
    key: &str,
    new_value: &Value,
    field_name: &str,
    section: Option<&str>,
) -> Option<FieldChange> {
    let original = store.values.remove(key)?;

    let old_value = format_for_display(&original);
    let new_value = format_for_display(new_value);
    if old_value == new_value {
        return None;
    }

    Some(FieldChange {
        field_name: field_name.to_string(),
        section: section.map(str::to_string),
        old_value: Some(old_value),
        new_value: Some(new_value),
        change_type: ChangeType::Edit,
    })
}
