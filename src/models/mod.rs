//! Core data models for fieldlog
//!
//! Inspection log kinds, the in-progress draft of a log, and the fields
//! derived from other fields.

pub mod derived;
pub mod draft;
pub mod log_kind;

pub use derived::apply_derived;
pub use draft::{ChangeListener, DraftRecord, FormDraft};
pub use log_kind::{humanize_field, LogKind, NestedObject, RepeatableList};
