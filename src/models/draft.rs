//! In-progress inspection log record
//!
//! `FormDraft` is the state holder behind one open form. It knows nothing
//! about auditing; the session layer wraps every write with the tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

use super::derived::apply_derived;
use super::log_kind::LogKind;
use crate::error::{FieldLogError, FieldLogResult};

/// Callback handed the full value map after every change
pub type ChangeListener = Box<dyn FnMut(&Map<String, Value>) + Send>;

/// Serialized form of a draft on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    pub kind: LogKind,
    pub report_id: String,
    pub values: Map<String, Value>,
    pub updated_at: DateTime<Utc>,
}

pub struct FormDraft {
    kind: LogKind,
    report_id: String,
    values: Map<String, Value>,
    listener: Option<ChangeListener>,
}

impl FormDraft {
    /// Start a draft from the kind's defaults with `supplied` values on top
    ///
    /// Nested objects in `supplied` merge one level deep, so a partial
    /// nested object keeps the default keys it does not mention.
    pub fn new(
        kind: LogKind,
        report_id: impl Into<String>,
        supplied: Map<String, Value>,
    ) -> FieldLogResult<Self> {
        let report_id = report_id.into();
        if report_id.trim().is_empty() {
            return Err(FieldLogError::Validation(
                "Report id cannot be empty".into(),
            ));
        }

        let mut values = kind.defaults();
        for (key, value) in supplied {
            match (values.get_mut(&key), value) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    existing.extend(incoming);
                }
                (_, value) => {
                    values.insert(key, value);
                }
            }
        }
        apply_derived(kind, &mut values);

        Ok(Self {
            kind,
            report_id,
            values,
            listener: None,
        })
    }

    pub fn from_record(record: DraftRecord) -> FieldLogResult<Self> {
        Self::new(record.kind, record.report_id, record.values)
    }

    pub fn to_record(&self) -> DraftRecord {
        DraftRecord {
            kind: self.kind,
            report_id: self.report_id.clone(),
            values: self.values.clone(),
            updated_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> LogKind {
        self.kind
    }

    pub fn report_id(&self) -> &str {
        &self.report_id
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Register the parent callback, replacing any previous one
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&Map<String, Value>) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    /// Current value of a top-level field (`Null` when absent)
    pub fn field(&self, field: &str) -> Value {
        self.values.get(field).cloned().unwrap_or(Value::Null)
    }

    /// Current value of a field inside a nested object
    pub fn nested(&self, parent: &str, field: &str) -> Value {
        self.values
            .get(parent)
            .and_then(|p| p.get(field))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Current value of a field inside a list entry
    pub fn entry_field(&self, list: &str, entry_id: &str, field: &str) -> Value {
        self.entry(list, entry_id)
            .and_then(|entry| entry.get(field))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Find a list entry by id
    pub fn entry(&self, list: &str, entry_id: &str) -> Option<&Map<String, Value>> {
        self.values
            .get(list)?
            .as_array()?
            .iter()
            .filter_map(Value::as_object)
            .find(|entry| entry.get("id").and_then(Value::as_str) == Some(entry_id))
    }

    /// Entries of a repeatable list, empty when the list does not exist
    pub fn entries(&self, list: &str) -> Vec<&Map<String, Value>> {
        self.values
            .get(list)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_object).collect())
            .unwrap_or_default()
    }

    /// Display label of a list entry, falling back to its id
    pub fn entry_label(&self, list: &str, entry_id: &str) -> String {
        self.entry(list, entry_id)
            .and_then(|entry| entry.get("label"))
            .and_then(Value::as_str)
            .filter(|label| !label.is_empty())
            .unwrap_or(entry_id)
            .to_string()
    }

    /// Set a top-level field, returning the previous value
    ///
    /// Lists and nested sections can only be replaced by a value of the same shape.
    pub fn set_field(&mut self, field: &str, value: Value) -> FieldLogResult<Value> {
        self.ensure_writable(field)?;
        match self.values.get(field) {
            Some(Value::Array(_)) if !value.is_array() => {
                return Err(FieldLogError::Validation(format!(
                    "'{}' is a list of entries; add or remove entries instead",
                    field
                )))
            }
            Some(Value::Object(_)) if !value.is_object() => {
                return Err(FieldLogError::Validation(format!(
                    "'{}' is a nested section; set its fields individually",
                    field
                )))
            }
            _ => {}
        }
        let previous = self.values.insert(field.to_string(), value);
        self.changed();
        Ok(previous.unwrap_or(Value::Null))
    }

    /// Set a field of a one-level nested object, returning the previous value
    pub fn set_nested(&mut self, parent: &str, field: &str, value: Value) -> FieldLogResult<Value> {
        let object = match self.values.get_mut(parent) {
            Some(Value::Object(object)) => object,
            _ => {
                return Err(FieldLogError::Validation(format!(
                    "'{}' is not a nested object on a {} log",
                    parent, self.kind
                )))
            }
        };
        let previous = object.insert(field.to_string(), value);
        self.changed();
        Ok(previous.unwrap_or(Value::Null))
    }

    /// Set a field inside one list entry, returning the previous value
    pub fn set_entry_field(
        &mut self,
        list: &str,
        entry_id: &str,
        field: &str,
        value: Value,
    ) -> FieldLogResult<Value> {
        if field == "id" {
            return Err(FieldLogError::Validation(
                "Entry ids cannot be changed".into(),
            ));
        }

        let entry = self
            .values
            .get_mut(list)
            .and_then(Value::as_array_mut)
            .and_then(|items| {
                items
                    .iter_mut()
                    .filter_map(Value::as_object_mut)
                    .find(|entry| entry.get("id").and_then(Value::as_str) == Some(entry_id))
            })
            .ok_or_else(|| {
                FieldLogError::Validation(format!("No entry '{}' in list '{}'", entry_id, list))
            })?;

        let previous = entry.insert(field.to_string(), value);
        self.changed();
        Ok(previous.unwrap_or(Value::Null))
    }

    /// Append `{id, label}` to a repeatable list and return the new id
    ///
    /// Without a label the entry is numbered after the list's entry type,
    /// e.g. "Soft Spot #2".
    pub fn add_entry(&mut self, list: &str, label: Option<&str>) -> FieldLogResult<String> {
        let entry_type = self.kind.entry_type_for(list);
        let items = match self
            .values
            .entry(list.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(items) => items,
            _ => {
                return Err(FieldLogError::Validation(format!(
                    "'{}' is not a list on a {} log",
                    list, self.kind
                )))
            }
        };

        let id = new_entry_id();
        let label = match label {
            Some(label) if !label.trim().is_empty() => label.to_string(),
            _ => format!("{} #{}", entry_type, items.len() + 1),
        };

        let mut entry = Map::new();
        entry.insert("id".into(), Value::String(id.clone()));
        entry.insert("label".into(), Value::String(label));
        items.push(Value::Object(entry));

        self.changed();
        Ok(id)
    }

    /// Remove a list entry and return it
    pub fn remove_entry(
        &mut self,
        list: &str,
        entry_id: &str,
    ) -> FieldLogResult<Map<String, Value>> {
        let items = self
            .values
            .get_mut(list)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| FieldLogError::entry_not_found(entry_id))?;

        let position = items
            .iter()
            .position(|item| item.get("id").and_then(Value::as_str) == Some(entry_id))
            .ok_or_else(|| FieldLogError::entry_not_found(entry_id))?;

        let removed = match items.remove(position) {
            Value::Object(entry) => entry,
            _ => Map::new(),
        };

        self.changed();
        Ok(removed)
    }

    fn ensure_writable(&self, field: &str) -> FieldLogResult<()> {
        if self.kind.derived_fields().contains(&field) {
            return Err(FieldLogError::Validation(format!(
                "'{}' is computed and cannot be set directly",
                field
            )));
        }
        Ok(())
    }

    fn changed(&mut self) {
        apply_derived(self.kind, &mut self.values);
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.values);
        }
    }
}

impl fmt::Debug for FormDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormDraft")
            .field("kind", &self.kind)
            .field("report_id", &self.report_id)
            .field("values", &self.values)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

fn new_entry_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
