//! Display formatting for terminal output
//!
//! Plain fixed-width tables for audit entries and drafts.

pub mod audit;
pub mod draft;

pub use audit::{format_audit_row, format_audit_table};
pub use draft::{format_draft_details, format_draft_list};

/// Pad or cut a string to exactly `width` characters
pub(crate) fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        format!("{:width$}", s, width = width)
    } else {
        let cut: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
