//! fieldlog - field-level audit trail for pipeline inspection logs
//!
//! Inspectors fill in daily logs (ditching, hydrotest, tie-in, ...). Every
//! meaningful field edit is recorded as an audit entry naming the report,
//! the field, the old and new values, and who made the change.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `audit`: change tracking, audit entries, sinks
//! - `config`: configuration and path management
//! - `error`: custom error types
//! - `identity`: who is making changes
//! - `logging`: tracing setup for the binary
//! - `models`: log kinds, drafts, derived fields
//! - `storage`: JSON draft storage and the local audit log
//! - `supabase`: hosted backend client, sink and identity
//! - `services`: form sessions and backend assembly
//! - `cli`, `display`, `export`: command-line surface
//!
//! # Example
//!
//! ```rust,ignore
//! use fieldlog::config::{paths::FieldLogPaths, settings::Settings};
//! use fieldlog::services::{Backend, FormSession};
//! use fieldlog::storage::Storage;
//!
//! let paths = FieldLogPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths)?;
//! let backend = Backend::from_settings(&settings, &storage)?;
//!
//! let mut session = FormSession::open(storage.drafts.clone(), &backend, LogKind::Ditching, "rpt-1")?;
//! session.edit_field("specified_depth", json!("1.2"), None)?;
//! session.flush().await;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod identity;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;
pub mod supabase;

pub use error::{FieldLogError, FieldLogResult};
