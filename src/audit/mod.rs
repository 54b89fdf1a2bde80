//! Field-level audit trail
//!
//! Records who changed which field of which inspection log, and from what
//! to what, in an append-only audit log.
//!
//! # Architecture
//!
//! - `FieldAuditTracker`: captures a field's value on focus, compares on
//!   blur, and dispatches at most one entry per commit in the background.
//! - `PendingChanges`: the per-form map of values captured at focus time.
//! - `AuditEntry`: one persisted row (entity, section, field, old/new, actor).
//! - `AuditSink`: append-only persistence seam. `AuditLogger` writes JSONL
//!   locally; the Supabase sink lives in `crate::supabase`.
//! - `format_for_display`: the canonical string form used both for the
//!   comparison and for the stored values.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fieldlog::audit::{AuditLogger, FieldAuditTracker};
//! use fieldlog::identity::StaticIdentity;
//! use serde_json::json;
//!
//! let mut tracker = FieldAuditTracker::new(
//!     "DitchLog",
//!     Some(report_id),
//!     Arc::new(StaticIdentity::anonymous()),
//!     Arc::new(AuditLogger::new(audit_log_path)),
//! );
//!
//! tracker.field_focus("specified_depth", &json!(""));
//! tracker.field_blur("specified_depth", &json!("1.2"), Some("Specified Depth"));
//! tracker.flush().await;
//! ```

mod entry;
mod format;
mod logger;
mod pending;
mod sink;
mod tracker;

pub use entry::{Actor, AuditEntry, ChangeType, FieldChange};
pub use format::{format_for_display, EMPTY_MARKER};
pub use logger::AuditLogger;
pub use pending::{begin_tracking, compare_and_clear, PendingChanges, TrackingKey};
pub use sink::{AuditSink, MemorySink};
pub use tracker::FieldAuditTracker;
