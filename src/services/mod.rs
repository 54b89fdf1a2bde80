//! Service layer for fieldlog
//!
//! Wires drafts, the audit tracker, storage and the configured backend
//! into form sessions.

pub mod backend;
pub mod session;

pub use backend::Backend;
pub use session::{FormSession, Submission};
