//! Audit trail CLI commands
//!
//! Reads the local JSONL log. Entries written to Supabase are queried
//! there, not here.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use crate::audit::AuditEntry;
use crate::display::format_audit_table;
use crate::error::{FieldLogError, FieldLogResult};
use crate::export::{export_audit_csv, export_audit_json, export_audit_yaml, AuditExport};
use crate::storage::Storage;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    Yaml,
}

/// Audit subcommands
#[derive(Subcommand)]
pub enum AuditCommands {
    /// Show recent audit entries
    List {
        /// Only entries for this report ID
        #[arg(short, long)]
        entity_id: Option<String>,
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Print each entry on its own block instead of a table
        #[arg(long)]
        long: bool,
    },
    /// Export the audit trail to a file
    Export {
        /// Output file path
        output: PathBuf,
        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,
        /// Only entries for this report ID
        #[arg(short, long)]
        entity_id: Option<String>,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

/// Handle an audit command
pub fn handle_audit_command(storage: &Storage, cmd: AuditCommands) -> FieldLogResult<()> {
    match cmd {
        AuditCommands::List {
            entity_id,
            limit,
            long,
        } => {
            let (entries, total) = match entity_id.as_deref() {
                Some(id) => {
                    let mut all = storage.audit.read_for_entity(id)?;
                    let total = all.len();
                    all.drain(..total.saturating_sub(limit));
                    (all, total)
                }
                None => (
                    storage.audit.read_recent(limit)?,
                    storage.audit.entry_count()?,
                ),
            };

            if long {
                for entry in &entries {
                    println!("{}\n", entry.format_human_readable());
                }
            } else {
                print!("{}", format_audit_table(&entries));
            }

            if total > entries.len() {
                println!("\nShowing {} of {} entries", entries.len(), total);
            }
        }

        AuditCommands::Export {
            output,
            format,
            entity_id,
            pretty,
        } => {
            let entries = select_entries(storage, entity_id.as_deref())?;
            let count = entries.len();

            let file = File::create(&output).map_err(|e| {
                FieldLogError::Export(format!(
                    "Failed to create file {}: {}",
                    output.display(),
                    e
                ))
            })?;
            let mut writer = BufWriter::new(file);

            match format {
                ExportFormat::Csv => export_audit_csv(&entries, &mut writer)?,
                ExportFormat::Json => {
                    export_audit_json(&AuditExport::new(entries, entity_id), &mut writer, pretty)?
                }
                ExportFormat::Yaml => {
                    export_audit_yaml(&AuditExport::new(entries, entity_id), &mut writer)?
                }
            }

            println!("Exported {} audit entries to: {}", count, output.display());
        }
    }

    Ok(())
}

fn select_entries(storage: &Storage, entity_id: Option<&str>) -> FieldLogResult<Vec<AuditEntry>> {
    match entity_id {
        Some(id) => storage.audit.read_for_entity(id),
        None => storage.audit.read_all(),
    }
}
