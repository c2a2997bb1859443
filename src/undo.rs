//! Undo log for the most recent organization pass.
//!
//! A [`RunBatch`] holds the move records of one run; replaying it restores
//! prior file locations. Undo is single-level and best-effort: only the most
//! recent batch is retained, and a record whose file is no longer at its
//! recorded destination (moved or deleted by something else since) is skipped
//! rather than treated as a failure. Files deleted after the run cannot be
//! recovered; that limitation is part of the contract.

use std::fs;
use std::path::PathBuf;

/// One completed (or previewed) relocation.
#[derive(Debug, Clone)]
pub struct MoveRecord {
    /// Where the file was before the run.
    pub original_path: PathBuf,
    /// The category subdirectory it was moved (or would move) into.
    pub destination_dir: PathBuf,
    /// The resolved category name.
    pub category: String,
}

/// The ordered move records of the most recent run.
///
/// At most one batch is retained at a time; a new run replaces it wholesale
/// and a completed undo pass consumes it.
#[derive(Debug, Clone)]
pub struct RunBatch {
    preview: bool,
    records: Vec<MoveRecord>,
}

impl RunBatch {
    /// Creates an empty batch for a run in the given mode.
    pub fn new(preview: bool) -> Self {
        Self {
            preview,
            records: Vec::new(),
        }
    }

    /// Appends a record. Records must be pushed in the order the moves were
    /// performed; undo replays them in that same order.
    pub fn push(&mut self, record: MoveRecord) {
        self.records.push(record);
    }

    /// True if this batch came from a preview run.
    pub fn is_preview(&self) -> bool {
        self.preview
    }

    /// The records in move order.
    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Outcome of one undo pass.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Files moved back to their original paths.
    pub restored: usize,
    /// Records whose file was no longer at the recorded destination.
    pub skipped: usize,
    /// Records whose restore rename failed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl UndoReport {
    /// True if nothing was skipped or failed.
    pub fn is_complete_success(&self) -> bool {
        self.skipped == 0 && self.failed.is_empty()
    }
}

/// Replays `batch`, restoring each file to its original path.
///
/// Records are processed in the order the moves were performed. A preview
/// batch restores nothing: no file was relocated, so probing destinations
/// could only ever touch files the run never moved.
pub(crate) fn restore_batch(batch: &RunBatch) -> UndoReport {
    let mut report = UndoReport::default();
    if batch.is_preview() {
        return report;
    }

    for record in batch.records() {
        let Some(file_name) = record.original_path.file_name() else {
            report.failed.push((
                record.original_path.clone(),
                "record has no file name".to_string(),
            ));
            continue;
        };

        let current = record.destination_dir.join(file_name);
        if !current.exists() {
            report.skipped += 1;
            continue;
        }

        match fs::rename(&current, &record.original_path) {
            Ok(()) => report.restored += 1,
            Err(e) => report.failed.push((current, e.to_string())),
        }
    }

    report
}
