//! Draft repository for JSON storage
//!
//! One file per draft under `data/drafts/`, named `<kind>-<report>.json` with the report id percent-encoded.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::config::paths::FieldLogPaths;
use crate::error::{FieldLogError, FieldLogResult};
use crate::models::{DraftRecord, FormDraft, LogKind};

use super::file_io::{read_json, write_json_atomic};

/// Repository for draft persistence
#[derive(Debug, Clone)]
pub struct DraftRepository {
    paths: FieldLogPaths,
}

impl DraftRepository {
    pub fn new(paths: FieldLogPaths) -> Self {
        Self { paths }
    }

    pub fn path_for(&self, kind: LogKind, report_id: &str) -> PathBuf {
        self.paths.draft_file(kind, report_id)
    }

    pub fn exists(&self, kind: LogKind, report_id: &str) -> bool {
        self.path_for(kind, report_id).exists()
    }

    /// Load a saved draft
    ///
    /// # Errors
    ///
    /// `NotFound` if no draft was saved for this kind and report, `Storage`
    /// if the file on disk belongs to a different report.
    pub fn load(&self, kind: LogKind, report_id: &str) -> FieldLogResult<FormDraft> {
        let path = self.path_for(kind, report_id);
        let record: Option<DraftRecord> = read_json(&path)?;
        match record {
            Some(record) if record.kind != kind || record.report_id != report_id => {
                Err(FieldLogError::Storage(format!(
                    "Draft file {} holds {} {}, not {} {}",
                    path.display(),
                    record.kind,
                    record.report_id,
                    kind,
                    report_id
                )))
            }
            Some(record) => FormDraft::from_record(record),
            None => Err(FieldLogError::draft_not_found(format!(
                "{} {}",
                kind, report_id
            ))),
        }
    }

    /// Load a saved draft, or start a blank one
    pub fn load_or_new(&self, kind: LogKind, report_id: &str) -> FieldLogResult<FormDraft> {
        match self.load(kind, report_id) {
            Err(e) if e.is_not_found() => {
                debug!(kind = %kind, report_id, "starting new draft");
                FormDraft::new(kind, report_id, Default::default())
            }
            other => other,
        }
    }

    pub fn save(&self, draft: &FormDraft) -> FieldLogResult<()> {
        write_json_atomic(
            self.path_for(draft.kind(), draft.report_id()),
            &draft.to_record(),
        )
    }

    /// All saved drafts, most recently updated first
    ///
    /// Unreadable files are skipped with a warning.
    pub fn list(&self) -> FieldLogResult<Vec<DraftRecord>> {
        let dir = self.paths.drafts_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|e| {
            FieldLogError::Storage(format!("Failed to read {}: {}", dir.display(), e))
        })?;

        let mut records = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match read_json::<DraftRecord, _>(&path) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable draft"),
            }
        }

        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }
}
