use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tempfile::TempDir;

use fieldlog::audit::{
    begin_tracking, compare_and_clear, format_for_display, AuditLogger, ChangeType,
    FieldAuditTracker, MemorySink, PendingChanges,
};
use fieldlog::config::settings::{BackendKind, InspectorSettings, Settings};
use fieldlog::config::FieldLogPaths;
use fieldlog::identity::StaticIdentity;
use fieldlog::models::LogKind;
use fieldlog::services::{Backend, FormSession};
use fieldlog::storage::Storage;

#[test]
fn pending_store_semantics() {
    let mut store = PendingChanges::new();

    assert!(begin_tracking(&mut store, "x", &json!(5)));
    assert!(!begin_tracking(&mut store, "x", &json!(7)));
    assert!(compare_and_clear(&mut store, "x", &json!(5), "X", None).is_none());
    assert!(!store.contains("x"));

    begin_tracking(&mut store, "x", &json!(5));
    let change = compare_and_clear(&mut store, "x", &json!(9), "Depth", None).unwrap();
    assert_eq!(change.field_name, "Depth");
    assert_eq!(change.old_value.as_deref(), Some("5"));
    assert_eq!(change.new_value.as_deref(), Some("9"));

    assert!(compare_and_clear(&mut store, "never", &json!(1), "Never", None).is_none());
}

#[test]
fn display_format_markers() {
    assert_eq!(format_for_display(&Value::Null), "(empty)");
    assert_eq!(format_for_display(&json!("")), "(empty)");
    assert_eq!(format_for_display(&json!(true)), "Yes");
    assert_eq!(format_for_display(&json!(false)), "No");
}

#[tokio::test]
async fn ditch_log_session_writes_local_audit_trail() {
    let temp_dir = TempDir::new().unwrap();
    let paths = FieldLogPaths::with_base_dir(temp_dir.path().to_path_buf());
    let storage = Storage::new(paths).unwrap();

    let mut settings = Settings::default();
    settings.inspector = InspectorSettings {
        id: Some("insp-7".into()),
        email: Some("dana@example.com".into()),
        name: Some("Dana Reyes".into()),
        role: Some("inspector".into()),
    };
    let backend = Backend::from_settings(&settings, &storage).unwrap();
    assert_eq!(backend.kind, BackendKind::Local);

    let mut session =
        FormSession::open(storage.drafts.clone(), &backend, LogKind::Ditching, "rpt-42").unwrap();

    let snapshots = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&snapshots);
    session.on_change(move |_| *counter.lock().unwrap() += 1);

    session
        .edit_field("specified_depth", json!("1.2"), None)
        .unwrap();
    session.flush().await;
    session.edit_field("actual_depth", json!(1.45), None).unwrap();
    session.flush().await;

    assert_eq!(session.draft().field("depth_variance"), json!(0.25));
    assert_eq!(*snapshots.lock().unwrap(), 2);

    let entries = storage.audit.read_for_entity("rpt-42").unwrap();
    assert_eq!(entries.len(), 2);

    let first = &entries[0];
    assert_eq!(first.entity_type, "DitchLog");
    assert_eq!(first.field_name, "Specified Depth");
    assert_eq!(first.old_value.as_deref(), Some("(empty)"));
    assert_eq!(first.new_value.as_deref(), Some("1.2"));
    assert_eq!(first.change_type, ChangeType::Edit);
    assert_eq!(first.actor.user_id.as_deref(), Some("insp-7"));
    assert_eq!(first.actor.user_name.as_deref(), Some("Dana Reyes"));
}

#[tokio::test]
async fn tracker_without_entity_id_is_silent() {
    let sink = Arc::new(MemorySink::new());
    let mut tracker = FieldAuditTracker::new(
        "HydrotestLog",
        None,
        Arc::new(StaticIdentity::anonymous()),
        sink.clone(),
    );

    tracker.field_focus("test_pressure", &json!(""));
    assert!(tracker
        .field_blur("test_pressure", &json!(9930), None)
        .is_none());
    assert!(tracker.record_entry_added("Weld", Some("Weld #1")).is_none());
    tracker.flush().await;

    assert!(sink.is_empty());
}

#[tokio::test]
async fn logger_sink_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("audit.log");
    let mut tracker = FieldAuditTracker::new(
        "CleanupLog",
        Some("rpt-9".into()),
        Arc::new(StaticIdentity::anonymous()),
        Arc::new(AuditLogger::new(log_path.clone())),
    );

    tracker.field_focus("seed_mix", &json!(""));
    tracker.field_blur("seed_mix", &json!("Native Mix B"), Some("Seed Mix"));
    tracker.flush().await;

    let entries = AuditLogger::new(log_path).read_all().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].actor.is_anonymous());
    assert_eq!(entries[0].new_value.as_deref(), Some("Native Mix B"));
}
