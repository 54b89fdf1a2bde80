//! Export module for fieldlog
//!
//! Audit trail export in three formats:
//! - CSV: one row per entry (spreadsheet-compatible)
//! - JSON: machine-readable, schema-versioned
//! - YAML: human-readable

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_audit_csv;
pub use json::{export_audit_json, import_audit_json, AuditExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_audit_yaml;
