//! Field audit tracker
//!
//! A form calls the focus helpers when editing of a field begins and the
//! blur helpers when it ends. The tracker compares the two values and, when
//! they differ, hands the change to a background task that resolves the
//! actor and appends the entry to the sink. The form never waits on that
//! task and never sees its failures.
//!
//! At most one emission per tracker is in flight. A change committed while
//! another is still being written is dropped, and the commit reports `None`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::entry::{AuditEntry, ChangeType, FieldChange};
use super::pending::{begin_tracking, compare_and_clear, PendingChanges, TrackingKey};
use super::sink::AuditSink;
use crate::identity::{resolve_actor, IdentityProvider};

/// Clears the in-flight flag when the emission task ends, panics included
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Per-form change tracker
pub struct FieldAuditTracker {
    entity_type: String,
    entity_id: Option<String>,
    identity: Arc<dyn IdentityProvider>,
    sink: Arc<dyn AuditSink>,
    pending: PendingChanges,
    in_flight: Arc<AtomicBool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl FieldAuditTracker {
    /// Create a tracker for one form instance
    ///
    /// Without an `entity_id` the tracker is inert: nothing is tracked and
    /// nothing is emitted.
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: Option<String>,
        identity: Arc<dyn IdentityProvider>,
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.filter(|id| !id.trim().is_empty()),
            identity,
            sink,
            pending: PendingChanges::new(),
            in_flight: Arc::new(AtomicBool::new(false)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.entity_id.is_some()
    }

    pub fn pending(&self) -> &PendingChanges {
        &self.pending
    }

    /// Whether an emission is currently being written
    pub fn is_emitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Capture the value a field holds as editing begins
    ///
    /// Returns `false` if the key was already captured or the tracker is inert.
    pub fn begin_tracking(&mut self, key: &TrackingKey, current: &Value) -> bool {
        if !self.is_enabled() {
            return false;
        }
        begin_tracking(&mut self.pending, &key.to_string(), current)
    }

    /// Compare the captured value with `new_value` and emit on difference
    ///
    /// `display_name` defaults to the raw field name and `section` to the
    /// entity type. The captured value is discarded either way.
    pub fn commit_and_compare(
        &mut self,
        key: &TrackingKey,
        new_value: &Value,
        display_name: Option<&str>,
        section: Option<&str>,
    ) -> Option<FieldChange> {
        let field_name = display_name.unwrap_or_else(|| key.field_name());
        let section = section.unwrap_or(self.entity_type.as_str());
        let change = compare_and_clear(
            &mut self.pending,
            &key.to_string(),
            new_value,
            field_name,
            Some(section),
        )?;
        self.dispatch(change)
    }

    /// Record that a repeatable-list entry was added
    pub fn record_entry_added(
        &self,
        entry_type: &str,
        label: Option<&str>,
    ) -> Option<FieldChange> {
        self.dispatch(FieldChange {
            field_name: entry_type.to_string(),
            section: Some(self.entity_type.clone()),
            old_value: None,
            new_value: label.map(str::to_string),
            change_type: ChangeType::Create,
        })
    }

    /// Record that a repeatable-list entry was removed
    pub fn record_entry_removed(
        &self,
        entry_type: &str,
        label: Option<&str>,
    ) -> Option<FieldChange> {
        self.dispatch(FieldChange {
            field_name: entry_type.to_string(),
            section: Some(self.entity_type.clone()),
            old_value: label.map(str::to_string),
            new_value: None,
            change_type: ChangeType::Delete,
        })
    }

    /// Capture a top-level field when it gains focus
    pub fn field_focus(&mut self, field: &str, value: &Value) -> bool {
        self.begin_tracking(&TrackingKey::field(field), value)
    }

    /// Commit a top-level field; the section is the entity type
    pub fn field_blur(
        &mut self,
        field: &str,
        value: &Value,
        display_name: Option<&str>,
    ) -> Option<FieldChange> {
        self.commit_and_compare(&TrackingKey::field(field), value, display_name, None)
    }

    /// Capture a field of a nested object
    pub fn nested_focus(&mut self, parent: &str, field: &str, value: &Value) -> bool {
        self.begin_tracking(&TrackingKey::nested(parent, field), value)
    }

    /// Section is the parent's label, or the parent field name
    pub fn nested_blur(
        &mut self,
        parent: &str,
        field: &str,
        value: &Value,
        display_name: Option<&str>,
        parent_label: Option<&str>,
    ) -> Option<FieldChange> {
        let section = parent_label.unwrap_or(parent).to_string();
        self.commit_and_compare(
            &TrackingKey::nested(parent, field),
            value,
            display_name,
            Some(&section),
        )
    }

    /// Capture a field of one list entry
    pub fn entry_focus(&mut self, entry_id: &str, field: &str, value: &Value) -> bool {
        self.begin_tracking(&TrackingKey::entry(entry_id, field), value)
    }

    /// Section is `"<EntityType> - <EntryLabel>"`
    pub fn entry_blur(
        &mut self,
        entry_id: &str,
        field: &str,
        value: &Value,
        display_name: Option<&str>,
        entry_label: &str,
    ) -> Option<FieldChange> {
        let section = format!("{} - {}", self.entity_type, entry_label);
        self.commit_and_compare(
            &TrackingKey::entry(entry_id, field),
            value,
            display_name,
            Some(&section),
        )
    }

    /// Wait for every emission dispatched so far
    ///
    /// Emission outcomes are still swallowed; this only lets a short-lived
    /// process finish its writes before exiting.
    pub async fn flush(&self) {
        let handles = match self.tasks.lock() {
            Ok(mut tasks) => std::mem::take(&mut *tasks),
            Err(_) => Vec::new(),
        };

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "audit emission task did not complete");
            }
        }
    }

    /// Hand a change to a background emission task
    fn dispatch(&self, change: FieldChange) -> Option<FieldChange> {
        let Some(entity_id) = self.entity_id.clone() else {
            debug!(entity_type = %self.entity_type, "no entity id, skipping audit entry");
            return None;
        };

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(
                entity_type = %self.entity_type,
                field = %change.field_name,
                "audit emission already in flight, dropping change"
            );
            return None;
        }
        let guard = InFlightGuard(Arc::clone(&self.in_flight));

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(error = %e, field = %change.field_name, "no async runtime, dropping audit entry");
                return None;
            }
        };

        let identity = Arc::clone(&self.identity);
        let sink = Arc::clone(&self.sink);
        let entity_type = self.entity_type.clone();
        let record = change.clone();

        let handle = runtime.spawn(async move {
            let _guard = guard;
            let actor = resolve_actor(identity.as_ref()).await;
            let entry = AuditEntry::from_change(entity_type, entity_id, record, actor);

            match sink.append(&entry).await {
                Ok(()) => debug!(
                    entity_type = %entry.entity_type,
                    entity_id = %entry.entity_id,
                    field = %entry.field_name,
                    "audit entry recorded"
                ),
                Err(e) => error!(
                    error = %e,
                    entity_type = %entry.entity_type,
                    entity_id = %entry.entity_id,
                    field = %entry.field_name,
                    "failed to record audit entry"
                ),
            }
        });

        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.retain(|task| !task.is_finished());
            tasks.push(handle);
        }

        Some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::sink::MemorySink;
    use crate::error::{FieldLogError, FieldLogResult};
    use crate::identity::{SessionUser, StaticIdentity, UserProfile};
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Notify;

    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn append(&self, _entry: &AuditEntry) -> FieldLogResult<()> {
            Err(FieldLogError::Backend("insert rejected".into()))
        }
    }

    struct GatedSink {
        gate: Arc<Notify>,
        inner: MemorySink,
    }

    #[async_trait]
    impl AuditSink for GatedSink {
        async fn append(&self, entry: &AuditEntry) -> FieldLogResult<()> {
            self.gate.notified().await;
            self.inner.append(entry).await
        }
    }

    struct UnreachableIdentity;

    #[async_trait]
    impl IdentityProvider for UnreachableIdentity {
        async fn current_user(&self) -> FieldLogResult<Option<SessionUser>> {
            Err(FieldLogError::Backend("auth service unavailable".into()))
        }

        async fn profile(&self, _user_id: &str) -> FieldLogResult<Option<UserProfile>> {
            Err(FieldLogError::Backend("auth service unavailable".into()))
        }
    }

    fn inspector() -> Arc<dyn IdentityProvider> {
        Arc::new(StaticIdentity::new(
            SessionUser {
                id: "u-1".into(),
                email: Some("dana@example.com".into()),
            },
            Some(UserProfile {
                full_name: Some("Dana Reyes".into()),
                role: Some("inspector".into()),
            }),
        ))
    }

    fn ditch_tracker(sink: Arc<MemorySink>) -> FieldAuditTracker {
        FieldAuditTracker::new("DitchLog", Some("rpt-42".into()), inspector(), sink)
    }

    #[tokio::test]
    async fn test_specified_depth_scenario() {
        let sink = Arc::new(MemorySink::new());
        let mut tracker = ditch_tracker(sink.clone());

        tracker.field_focus("specified_depth", &json!(""));
        let change = tracker
            .field_blur("specified_depth", &json!("1.2"), Some("Specified Depth"))
            .unwrap();
        assert_eq!(change.old_value.as_deref(), Some("(empty)"));
        tracker.flush().await;

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.field_name, "Specified Depth");
        assert_eq!(entry.old_value.as_deref(), Some("(empty)"));
        assert_eq!(entry.new_value.as_deref(), Some("1.2"));
        assert_eq!(entry.entity_type, "DitchLog");
        assert_eq!(entry.entity_id, "rpt-42");
        assert_eq!(entry.section.as_deref(), Some("DitchLog"));
        assert_eq!(entry.actor.user_name.as_deref(), Some("Dana Reyes"));
    }

    #[tokio::test]
    async fn test_no_op_edit_emits_nothing() {
        let sink = Arc::new(MemorySink::new());
        let mut tracker = ditch_tracker(sink.clone());

        let key = TrackingKey::field("x");
        tracker.begin_tracking(&key, &json!(5));
        assert!(tracker
            .commit_and_compare(&key, &json!(5), None, None)
            .is_none());
        assert!(!tracker.pending().contains("x"));

        tracker.flush().await;
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_raw_field_name_is_default() {
        let sink = Arc::new(MemorySink::new());
        let mut tracker = ditch_tracker(sink.clone());

        let key = TrackingKey::field("x");
        tracker.begin_tracking(&key, &json!(5));
        let change = tracker
            .commit_and_compare(&key, &json!(9), Some("Depth"), None)
            .unwrap();
        assert_eq!(change.field_name, "Depth");
        assert_eq!(change.old_value.as_deref(), Some("5"));
        assert_eq!(change.new_value.as_deref(), Some("9"));

        tracker.flush().await;
        tracker.begin_tracking(&key, &json!(9));
        let change = tracker
            .commit_and_compare(&key, &json!(10), None, None)
            .unwrap();
        assert_eq!(change.field_name, "x");
    }

    #[tokio::test]
    async fn test_never_tracked_key_emits_nothing() {
        let sink = Arc::new(MemorySink::new());
        let mut tracker = ditch_tracker(sink.clone());

        assert!(tracker
            .field_blur("actual_depth", &json!("2.0"), None)
            .is_none());
        tracker.flush().await;
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_nested_and_entry_sections() {
        let sink = Arc::new(MemorySink::new());
        let mut tracker = ditch_tracker(sink.clone());

        tracker.nested_focus("padding", "material", &json!("sand"));
        tracker
            .nested_blur(
                "padding",
                "material",
                &json!("screened soil"),
                Some("Material"),
                Some("Padding"),
            )
            .unwrap();
        tracker.flush().await;

        tracker.entry_focus("e-1", "length", &json!(3));
        tracker
            .entry_blur("e-1", "length", &json!(4.5), Some("Length"), "Soft Spot #1")
            .unwrap();
        tracker.flush().await;

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].section.as_deref(), Some("Padding"));
        assert_eq!(entries[1].section.as_deref(), Some("DitchLog - Soft Spot #1"));
        assert_eq!(entries[1].new_value.as_deref(), Some("4.5"));
    }

    #[tokio::test]
    async fn test_entry_added_and_removed() {
        let sink = Arc::new(MemorySink::new());
        let tracker = ditch_tracker(sink.clone());

        let added = tracker
            .record_entry_added("Soft Spot", Some("Soft Spot #1"))
            .unwrap();
        assert_eq!(added.change_type, ChangeType::Create);
        assert!(added.old_value.is_none());
        assert_eq!(added.new_value.as_deref(), Some("Soft Spot #1"));
        tracker.flush().await;

        let removed = tracker
            .record_entry_removed("Soft Spot", Some("Soft Spot #1"))
            .unwrap();
        assert_eq!(removed.change_type, ChangeType::Delete);
        assert_eq!(removed.old_value.as_deref(), Some("Soft Spot #1"));
        assert!(removed.new_value.is_none());
        tracker.flush().await;

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].change_type, ChangeType::Create);
        assert_eq!(entries[1].change_type, ChangeType::Delete);
    }

    #[tokio::test]
    async fn test_missing_entity_id_disables_tracker() {
        let sink = Arc::new(MemorySink::new());
        let mut tracker = FieldAuditTracker::new("DitchLog", None, inspector(), sink.clone());

        assert!(!tracker.is_enabled());
        assert!(!tracker.field_focus("specified_depth", &json!("")));
        assert!(tracker
            .field_blur("specified_depth", &json!("1.2"), None)
            .is_none());
        assert!(tracker.record_entry_added("Soft Spot", None).is_none());

        tracker.flush().await;
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_is_swallowed() {
        let mut tracker = FieldAuditTracker::new(
            "DitchLog",
            Some("rpt-1".into()),
            inspector(),
            Arc::new(FailingSink),
        );

        tracker.field_focus("pier_count", &json!(4));
        assert!(tracker.field_blur("pier_count", &json!(6), None).is_some());
        tracker.flush().await;

        assert!(!tracker.is_emitting());
        tracker.field_focus("pier_count", &json!(6));
        assert!(tracker.field_blur("pier_count", &json!(8), None).is_some());
        tracker.flush().await;
    }

    #[tokio::test]
    async fn test_identity_failure_still_records_entry() {
        let sink = Arc::new(MemorySink::new());
        let mut tracker = FieldAuditTracker::new(
            "HydrotestLog",
            Some("rpt-3".into()),
            Arc::new(UnreachableIdentity),
            sink.clone(),
        );

        tracker.field_focus("test_pressure", &json!(""));
        assert!(tracker
            .field_blur("test_pressure", &json!(9930), Some("Test Pressure"))
            .is_some());
        tracker.flush().await;

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        let actor = &entries[0].actor;
        assert!(actor.is_anonymous());
        assert!(actor.user_name.is_none());
        assert!(actor.user_email.is_none());
        assert!(actor.user_role.is_none());
        assert_eq!(entries[0].new_value.as_deref(), Some("9930"));
    }

    #[tokio::test]
    async fn test_emission_in_flight_drops_new_change() {
        let gate = Arc::new(Notify::new());
        let sink = Arc::new(GatedSink {
            gate: gate.clone(),
            inner: MemorySink::new(),
        });
        let mut tracker =
            FieldAuditTracker::new("DitchLog", Some("rpt-1".into()), inspector(), sink.clone());

        tracker.field_focus("a", &json!(1));
        tracker.field_focus("b", &json!(1));
        assert!(tracker.field_blur("a", &json!(2), None).is_some());
        assert!(tracker.is_emitting());
        assert!(tracker.field_blur("b", &json!(2), None).is_none());
        assert!(!tracker.pending().contains("b"));

        gate.notify_one();
        tracker.flush().await;
        assert!(!tracker.is_emitting());
        assert_eq!(sink.inner.len(), 1);
        assert_eq!(sink.inner.entries()[0].field_name, "a");
    }

    #[test]
    fn test_without_runtime_change_is_dropped() {
        let sink = Arc::new(MemorySink::new());
        let mut tracker = ditch_tracker(sink.clone());

        tracker.field_focus("specified_depth", &json!(""));
        assert!(tracker
            .field_blur("specified_depth", &json!("1.2"), None)
            .is_none());
        assert!(!tracker.is_emitting());
        assert!(sink.is_empty());
    }
}
