//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer.

pub mod audit;
pub mod draft;

pub use audit::{handle_audit_command, AuditCommands, ExportFormat};
pub use draft::{handle_draft_command, parse_cli_value, DraftCommands};
