use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use fieldlog::cli::{handle_audit_command, handle_draft_command, AuditCommands, DraftCommands};
use fieldlog::config::settings::{mask_secret, Settings};
use fieldlog::config::FieldLogPaths;
use fieldlog::services::Backend;
use fieldlog::storage::Storage;

#[derive(Parser)]
#[command(
    name = "fieldlog",
    version,
    about = "Field-level audit trail for pipeline inspection logs",
    long_about = "fieldlog keeps drafts of daily pipeline inspection logs and records \
                  every meaningful field change (who, what, from, to) in an \
                  append-only audit trail, locally or in a Supabase project."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Base directory for settings, drafts and the audit log
    #[arg(long, env = "FIELDLOG_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and default settings
    Init,

    /// Show current configuration and paths
    Config,

    /// Inspection log drafts
    #[command(subcommand)]
    Draft(DraftCommands),

    /// Local audit trail
    #[command(subcommand)]
    Audit(AuditCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    fieldlog::logging::init_tracing(cli.verbose)?;

    let paths = match cli.data_dir {
        Some(dir) => FieldLogPaths::with_base_dir(dir),
        None => FieldLogPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;
    let storage = Storage::new(paths.clone())?;

    match cli.command {
        Some(Commands::Init) => {
            if paths.is_initialized() {
                println!("fieldlog is already initialized at: {}", paths.base_dir().display());
            } else {
                Settings::default().save(&paths)?;
                println!("Initialized fieldlog at: {}", paths.base_dir().display());
                println!();
                println!("Edit {} to set your inspector identity", paths.settings_file().display());
                println!("or switch the backend to Supabase.");
            }
        }
        Some(Commands::Config) => {
            print_config(&paths, &settings);
            println!("  Audit entries:  {}", storage.audit.entry_count()?);
        }
        Some(Commands::Draft(cmd)) => {
            let backend = Backend::from_settings(&settings, &storage)?;
            handle_draft_command(&storage, &backend, cmd).await?;
        }
        Some(Commands::Audit(cmd)) => handle_audit_command(&storage, cmd)?,
        None => {
            println!("fieldlog - field audit trail for inspection logs");
            println!();
            println!("Run 'fieldlog --help' for usage information.");
        }
    }

    Ok(())
}

fn print_config(paths: &FieldLogPaths, settings: &Settings) {
    let masked = |secret: &Option<String>| {
        secret
            .as_deref()
            .map(mask_secret)
            .unwrap_or_else(|| "(not set)".to_string())
    };

    println!("fieldlog Configuration");
    println!("======================");
    println!("Base directory:   {}", paths.base_dir().display());
    println!("Drafts directory: {}", paths.drafts_dir().display());
    println!("Audit log:        {}", paths.audit_log().display());
    println!();
    println!("Settings:");
    println!("  Backend:        {}", settings.backend);
    println!(
        "  Supabase URL:   {}",
        settings.supabase.url.as_deref().unwrap_or("(not set)")
    );
    println!("  Anon key:       {}", masked(&settings.supabase.anon_key));
    println!("  Access token:   {}", masked(&settings.supabase.access_token));
    println!("  Audit table:    {}", settings.supabase.audit_table);
    println!("  Profiles table: {}", settings.supabase.profiles_table);
    println!(
        "  Inspector:      {}",
        settings
            .inspector
            .name
            .as_deref()
            .or(settings.inspector.email.as_deref())
            .unwrap_or("(anonymous)")
    );
}
