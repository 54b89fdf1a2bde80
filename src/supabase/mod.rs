//! Supabase backend
//!
//! REST client plus the audit sink and identity provider built on it.

pub mod audit_sink;
pub mod client;
pub mod identity;

pub use audit_sink::SupabaseAuditSink;
pub use client::SupabaseClient;
pub use identity::SupabaseIdentity;
