//! Configuration module for fieldlog
//!
//! - Path resolution with an environment override
//! - Settings persistence (backend selection, Supabase connection, inspector identity)

pub mod paths;
pub mod settings;

pub use paths::FieldLogPaths;
pub use settings::{BackendKind, Settings};
