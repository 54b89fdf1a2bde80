//! Backend assembly
//!
//! Picks the identity provider, audit sink and record store for the
//! configured backend.

use std::sync::Arc;

use tracing::info;

use crate::audit::AuditSink;
use crate::config::settings::{BackendKind, Settings};
use crate::error::FieldLogResult;
use crate::identity::{IdentityProvider, StaticIdentity};
use crate::storage::Storage;
use crate::supabase::{SupabaseAuditSink, SupabaseClient, SupabaseIdentity};

/// Collaborators handed to every form session
#[derive(Clone)]
pub struct Backend {
    pub kind: BackendKind,
    pub identity: Arc<dyn IdentityProvider>,
    pub sink: Arc<dyn AuditSink>,
    /// Where submitted records go; `None` keeps them local
    pub records: Option<Arc<SupabaseClient>>,
}

impl Backend {
    /// Build the collaborators described by `settings`
    ///
    /// # Errors
    ///
    /// `Config` if the Supabase backend is selected without a URL or key.
    pub fn from_settings(settings: &Settings, storage: &Storage) -> FieldLogResult<Self> {
        settings.validate()?;

        match settings.backend {
            BackendKind::Local => Ok(Self::local(settings, storage)),
            BackendKind::Supabase => {
                let client = Arc::new(SupabaseClient::from_settings(&settings.supabase)?);
                info!(url = %client.base_url(), session = client.has_session(), "using Supabase backend");

                Ok(Self {
                    kind: BackendKind::Supabase,
                    identity: Arc::new(SupabaseIdentity::new(
                        Arc::clone(&client),
                        settings.supabase.profiles_table.clone(),
                    )),
                    sink: Arc::new(SupabaseAuditSink::new(
                        Arc::clone(&client),
                        settings.supabase.audit_table.clone(),
                    )),
                    records: Some(client),
                })
            }
        }
    }

    /// JSONL audit log with the inspector identity from settings
    pub fn local(settings: &Settings, storage: &Storage) -> Self {
        Self {
            kind: BackendKind::Local,
            identity: Arc::new(StaticIdentity::from_settings(&settings.inspector)),
            sink: Arc::new(storage.audit.clone()),
            records: None,
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("kind", &self.kind)
            .field("records", &self.records.is_some())
            .finish()
    }
}
