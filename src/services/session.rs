//! Form session
//!
//! Binds one draft to its audit tracker and the draft repository. Every
//! edit runs focus, change and blur against the tracker, then saves the
//! draft, so callers get the audit trail without diffing anything.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;

use super::backend::Backend;
use crate::audit::{FieldAuditTracker, FieldChange};
use crate::error::FieldLogResult;
use crate::models::{humanize_field, FormDraft, LogKind};
use crate::storage::DraftRepository;
use crate::supabase::SupabaseClient;

/// Column submitted records are keyed on
const RECORD_KEY: &str = "report_id";

/// Where a submitted record ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Saved to the local draft file only
    Local,
    /// Also upserted into a Supabase table
    Remote { table: &'static str },
}

pub struct FormSession {
    draft: FormDraft,
    tracker: FieldAuditTracker,
    repository: DraftRepository,
    records: Option<Arc<SupabaseClient>>,
}

impl FormSession {
    pub fn new(draft: FormDraft, repository: DraftRepository, backend: &Backend) -> Self {
        let tracker = FieldAuditTracker::new(
            draft.kind().entity_type(),
            Some(draft.report_id().to_string()),
            Arc::clone(&backend.identity),
            Arc::clone(&backend.sink),
        );

        Self {
            draft,
            tracker,
            repository,
            records: backend.records.clone(),
        }
    }

    /// Open the saved draft for a report, or start a blank one
    pub fn open(
        repository: DraftRepository,
        backend: &Backend,
        kind: LogKind,
        report_id: &str,
    ) -> FieldLogResult<Self> {
        let draft = repository.load_or_new(kind, report_id)?;
        Ok(Self::new(draft, repository, backend))
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn tracker(&self) -> &FieldAuditTracker {
        &self.tracker
    }

    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&Map<String, Value>) + Send + 'static,
    {
        self.draft.on_change(listener);
    }

    /// Edit a top-level field
    ///
    /// Without a display name the field key is humanized ("specified_depth"
    /// becomes "Specified Depth").
    pub fn edit_field(
        &mut self,
        field: &str,
        value: Value,
        display_name: Option<&str>,
    ) -> FieldLogResult<Option<FieldChange>> {
        let current = self.draft.field(field);
        self.draft.set_field(field, value)?;

        let name = display_name.map_or_else(|| humanize_field(field), str::to_string);
        self.tracker.field_focus(field, &current);
        let change = self
            .tracker
            .field_blur(field, &self.draft.field(field), Some(&name));

        self.repository.save(&self.draft)?;
        Ok(change)
    }

    /// Edit a field of a nested object; the section is the parent's label
    pub fn edit_nested(
        &mut self,
        parent: &str,
        field: &str,
        value: Value,
        display_name: Option<&str>,
    ) -> FieldLogResult<Option<FieldChange>> {
        let current = self.draft.nested(parent, field);
        self.draft.set_nested(parent, field, value)?;

        let name = display_name.map_or_else(|| humanize_field(field), str::to_string);
        let parent_label = self.draft.kind().nested_label_for(parent);
        self.tracker.nested_focus(parent, field, &current);
        let change = self.tracker.nested_blur(
            parent,
            field,
            &self.draft.nested(parent, field),
            Some(&name),
            Some(&parent_label),
        );

        self.repository.save(&self.draft)?;
        Ok(change)
    }

    /// Edit a field inside one list entry
    ///
    /// `section_label` overrides the entry's own label in the audit section.
    pub fn edit_entry_field(
        &mut self,
        list: &str,
        entry_id: &str,
        field: &str,
        value: Value,
        display_name: Option<&str>,
        section_label: Option<&str>,
    ) -> FieldLogResult<Option<FieldChange>> {
        let current = self.draft.entry_field(list, entry_id, field);
        self.draft.set_entry_field(list, entry_id, field, value)?;

        let name = display_name.map_or_else(|| humanize_field(field), str::to_string);
        let label = section_label
            .map(str::to_string)
            .unwrap_or_else(|| self.draft.entry_label(list, entry_id));
        self.tracker.entry_focus(entry_id, field, &current);
        let change = self.tracker.entry_blur(
            entry_id,
            field,
            &self.draft.entry_field(list, entry_id, field),
            Some(&name),
            &label,
        );

        self.repository.save(&self.draft)?;
        Ok(change)
    }

    /// Add a list entry and return its id
    pub fn add_entry(&mut self, list: &str, label: Option<&str>) -> FieldLogResult<String> {
        let id = self.draft.add_entry(list, label)?;

        let entry_type = self.draft.kind().entry_type_for(list);
        let label = self.draft.entry_label(list, &id);
        self.tracker.record_entry_added(&entry_type, Some(&label));

        self.repository.save(&self.draft)?;
        Ok(id)
    }

    /// Remove a list entry and return it
    pub fn remove_entry(
        &mut self,
        list: &str,
        entry_id: &str,
    ) -> FieldLogResult<Map<String, Value>> {
        let label = self.draft.entry_label(list, entry_id);
        let removed = self.draft.remove_entry(list, entry_id)?;

        let entry_type = self.draft.kind().entry_type_for(list);
        self.tracker.record_entry_removed(&entry_type, Some(&label));

        self.repository.save(&self.draft)?;
        Ok(removed)
    }

    /// Save the draft and, with a record store, upsert it remotely
    pub async fn submit(&self) -> FieldLogResult<Submission> {
        self.repository.save(&self.draft)?;

        let Some(client) = &self.records else {
            info!(kind = %self.draft.kind(), report_id = %self.draft.report_id(), "draft saved locally");
            return Ok(Submission::Local);
        };

        let table = self.draft.kind().table_name();
        let mut record = self.draft.values().clone();
        record.insert(
            RECORD_KEY.to_string(),
            Value::String(self.draft.report_id().to_string()),
        );

        client.upsert_record(table, &record, RECORD_KEY).await?;
        info!(table, report_id = %self.draft.report_id(), "record submitted");
        Ok(Submission::Remote { table })
    }

    /// Wait for audit emissions dispatched by this session
    pub async fn flush(&self) {
        self.tracker.flush().await;
    }
}
