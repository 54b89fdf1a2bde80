//! Draft CLI commands
//!
//! Each command opens a form session, applies one edit, and waits for the
//! audit emission before returning so the process does not exit mid-write.

use clap::Subcommand;
use serde_json::Value;

use crate::audit::FieldChange;
use crate::display::{format_draft_details, format_draft_list};
use crate::error::FieldLogResult;
use crate::models::LogKind;
use crate::services::{Backend, FormSession, Submission};
use crate::storage::Storage;

/// Draft subcommands
#[derive(Subcommand)]
pub enum DraftCommands {
    /// List saved drafts
    List,
    /// Show a draft's current values
    Show {
        /// Log kind (clearing, ditching, grading, hdd, hydrotest, hydrovac, tie-in, cleanup)
        kind: LogKind,
        /// Report ID
        report: String,
    },
    /// Set a field value
    Set {
        kind: LogKind,
        report: String,
        /// Field key (e.g. specified_depth)
        field: String,
        /// New value; numbers, true/false and null are parsed as JSON
        value: String,
        /// Nested object holding the field (e.g. padding)
        #[arg(long, conflicts_with = "list")]
        parent: Option<String>,
        /// Repeatable list holding the field (e.g. soft_spots)
        #[arg(long, requires = "entry")]
        list: Option<String>,
        /// Entry ID within the list
        #[arg(long, requires = "list")]
        entry: Option<String>,
        /// Display name recorded in the audit trail
        #[arg(long)]
        label: Option<String>,
        /// Section label for list entries (defaults to the entry's label)
        #[arg(long, requires = "list")]
        section_label: Option<String>,
    },
    /// Add an entry to a repeatable list
    AddEntry {
        kind: LogKind,
        report: String,
        /// List field (e.g. soft_spots)
        list: String,
        /// Entry label (defaults to "<Entry Type> #N")
        #[arg(short, long)]
        label: Option<String>,
    },
    /// Remove an entry from a repeatable list
    RemoveEntry {
        kind: LogKind,
        report: String,
        list: String,
        /// Entry ID
        entry_id: String,
    },
    /// Submit a draft to the configured backend
    Submit { kind: LogKind, report: String },
}

/// Handle a draft command
pub async fn handle_draft_command(
    storage: &Storage,
    backend: &Backend,
    cmd: DraftCommands,
) -> FieldLogResult<()> {
    match cmd {
        DraftCommands::List => {
            let records = storage.drafts.list()?;
            print!("{}", format_draft_list(&records));
        }

        DraftCommands::Show { kind, report } => {
            let draft = storage.drafts.load(kind, &report)?;
            print!("{}", format_draft_details(&draft));
        }

        DraftCommands::Set {
            kind,
            report,
            field,
            value,
            parent,
            list,
            entry,
            label,
            section_label,
        } => {
            let mut session = FormSession::open(storage.drafts.clone(), backend, kind, &report)?;
            let value = parse_cli_value(&value);
            let label = label.as_deref();

            let change = match (parent, list, entry) {
                (Some(parent), _, _) => session.edit_nested(&parent, &field, value, label)?,
                (None, Some(list), Some(entry)) => session.edit_entry_field(
                    &list,
                    &entry,
                    &field,
                    value,
                    label,
                    section_label.as_deref(),
                )?,
                _ => session.edit_field(&field, value, label)?,
            };
            session.flush().await;

            print_change(change.as_ref());
        }

        DraftCommands::AddEntry {
            kind,
            report,
            list,
            label,
        } => {
            let mut session = FormSession::open(storage.drafts.clone(), backend, kind, &report)?;
            let id = session.add_entry(&list, label.as_deref())?;
            session.flush().await;

            println!(
                "Added {} ({}) with ID {}",
                session.draft().entry_label(&list, &id),
                kind.entry_type_for(&list),
                id
            );
        }

        DraftCommands::RemoveEntry {
            kind,
            report,
            list,
            entry_id,
        } => {
            let mut session = FormSession::open(storage.drafts.clone(), backend, kind, &report)?;
            let removed = session.remove_entry(&list, &entry_id)?;
            session.flush().await;

            let label = removed
                .get("label")
                .and_then(Value::as_str)
                .unwrap_or(&entry_id);
            println!("Removed {} from {}", label, list);
        }

        DraftCommands::Submit { kind, report } => {
            let session = FormSession::open(storage.drafts.clone(), backend, kind, &report)?;
            match session.submit().await? {
                Submission::Local => println!("Draft {} {} saved locally.", kind, report),
                Submission::Remote { table } => {
                    println!("Draft {} {} submitted to {}.", kind, report, table)
                }
            }
        }
    }

    Ok(())
}

/// Parse a CLI value: JSON scalars stay typed, anything else is a string
pub fn parse_cli_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => value,
        _ => Value::String(raw.to_string()),
    }
}

fn print_change(change: Option<&FieldChange>) {
    match change {
        Some(change) => println!(
            "Recorded change to {}: {} -> {}",
            change.field_name,
            change.old_value.as_deref().unwrap_or("-"),
            change.new_value.as_deref().unwrap_or("-")
        ),
        None => println!("No change recorded."),
    }
}
