//! Persistence seam for audit entries
//!
//! An [`AuditSink`] only ever appends. It never reads back, updates or
//! deletes rows it wrote.

use std::sync::Mutex;

use async_trait::async_trait;

use super::entry::AuditEntry;
use crate::error::{FieldLogError, FieldLogResult};

/// Append-only destination for audit entries
///
/// Object-safe so trackers can hold it as `Arc<dyn AuditSink>`.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append a single entry
    async fn append(&self, entry: &AuditEntry) -> FieldLogResult<()>;
}

/// Sink that keeps entries in process memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditSink for MemorySink {
    async fn append(&self, entry: &AuditEntry) -> FieldLogResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| FieldLogError::Storage(format!("Failed to acquire lock: {}", e)))?;
        entries.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::{Actor, ChangeType, FieldChange};

    #[tokio::test]
    async fn test_memory_sink_appends_in_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        for name in ["Specified Depth", "Actual Depth"] {
            let change = FieldChange {
                field_name: name.into(),
                section: None,
                old_value: Some("(empty)".into()),
                new_value: Some("1".into()),
                change_type: ChangeType::Edit,
            };
            let entry = AuditEntry::from_change("DitchLog", "rpt-1", change, Actor::default());
            sink.append(&entry).await.unwrap();
        }

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].field_name, "Specified Depth");
        assert_eq!(entries[1].field_name, "Actual Depth");
    }
}
