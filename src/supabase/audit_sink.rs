//! Audit rows written to a Supabase table

use std::sync::Arc;

use async_trait::async_trait;

use super::client::SupabaseClient;
use crate::audit::{AuditEntry, AuditSink};
use crate::error::FieldLogResult;

/// Appends each audit entry as one row of `audit_table`
#[derive(Debug, Clone)]
pub struct SupabaseAuditSink {
    client: Arc<SupabaseClient>,
    table: String,
}

impl SupabaseAuditSink {
    pub fn new(client: Arc<SupabaseClient>, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl AuditSink for SupabaseAuditSink {
    async fn append(&self, entry: &AuditEntry) -> FieldLogResult<()> {
        self.client.insert_row(&self.table, entry).await
    }
}
