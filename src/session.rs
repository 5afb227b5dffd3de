use std::path::Path;

use crate::error::CondorError;
use crate::importer::{parse_batch, ImportBatch};
use crate::models::ImportRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Upload,
    Preview,
    Complete,
}

/// True when the file name carries the `.csv` extension (the terminal
/// equivalent of the browser's declared-type check).
pub fn is_csv_filename(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("csv"))
}

/// One import attempt: upload → preview → complete. Preview can go back to
/// upload (discarding the parse); complete is terminal. Fatal conditions set
/// a user-facing alert and leave the state unchanged. All state is
/// session-local and dropped when the session is.
#[derive(Debug)]
pub struct ImportSession {
    state: SessionState,
    batch: Option<ImportBatch>,
    alert: Option<String>,
    committed: usize,
}

impl ImportSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Upload,
            batch: None,
            alert: None,
            committed: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    pub fn batch(&self) -> Option<&ImportBatch> {
        self.batch.as_ref()
    }

    pub fn valid_count(&self) -> usize {
        self.batch.as_ref().map_or(0, |b| b.valid_count())
    }

    pub fn invalid_count(&self) -> usize {
        self.batch.as_ref().map_or(0, |b| b.invalid_count())
    }

    pub fn total_count(&self) -> usize {
        self.batch.as_ref().map_or(0, |b| b.total())
    }

    /// Records accepted by the last commit.
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Offer a file by path: read it and run the pipeline. Returns true when
    /// the session advanced to preview.
    pub fn offer_file(&mut self, path: &Path) -> bool {
        let name = path.to_string_lossy();
        if self.state != SessionState::Upload {
            return false;
        }
        if !is_csv_filename(&name) {
            self.alert = Some(CondorError::NotCsv(name.to_string()).to_string());
            return false;
        }
        match std::fs::read_to_string(path) {
            Ok(text) => self.offer_content(&name, &text),
            Err(e) => {
                self.alert = Some(format!("Could not read {name}: {e}"));
                false
            }
        }
    }

    /// Offer already-read file content under a file name. Same transitions as
    /// `offer_file` minus the read.
    pub fn offer_content(&mut self, file_name: &str, content: &str) -> bool {
        if self.state != SessionState::Upload {
            return false;
        }
        if !is_csv_filename(file_name) {
            self.alert = Some(CondorError::NotCsv(file_name.to_string()).to_string());
            return false;
        }
        match parse_batch(content) {
            Ok(batch) => {
                self.batch = Some(batch);
                self.alert = None;
                self.state = SessionState::Preview;
                true
            }
            Err(e) => {
                self.alert = Some(e.to_string());
                false
            }
        }
    }

    /// Back from preview to upload, discarding the parsed batch.
    pub fn back(&mut self) {
        if self.state == SessionState::Preview {
            self.state = SessionState::Upload;
            self.batch = None;
            self.alert = None;
        }
    }

    pub fn can_commit(&self) -> bool {
        self.state == SessionState::Preview && self.valid_count() > 0
    }

    /// Commit the valid subset as one batch and move to complete. Refused
    /// (with an alert) outside preview or when nothing is valid.
    pub fn commit(&mut self) -> Option<Vec<ImportRecord>> {
        if !self.can_commit() {
            if self.state == SessionState::Preview {
                self.alert = Some("No valid rows to import".to_string());
            }
            return None;
        }
        let valid = self.batch.take().map(|b| b.into_valid()).unwrap_or_default();
        self.committed = valid.len();
        self.state = SessionState::Complete;
        self.alert = None;
        Some(valid)
    }
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}
