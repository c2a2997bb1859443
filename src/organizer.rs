//! The organization engine.
//!
//! Owns the selected directory, the collision policy, the audit log, and the
//! retained undo batch. A run enumerates the directory's eligible files,
//! classifies each by extension, performs (or previews) the move, and records
//! every landed file for undo. Execution is strictly sequential; progress is
//! reported through a caller-supplied callback after each file.

use crate::audit::{AuditLog, LOG_SUFFIX};
use crate::classifier::classify;
use crate::rules::CategoryRules;
use crate::settings::ExcludeMatcher;
use crate::undo::{self, MoveRecord, RunBatch, UndoReport};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that abort an engine operation.
///
/// Per-file problems (collisions, failed moves) are not in here; they are
/// collected in the [`RunReport`] and never abort the batch.
#[derive(Debug)]
pub enum OrganizeError {
    /// No directory has been selected yet.
    NoDirectorySelected,
    /// The target directory does not exist.
    TargetNotFound { path: PathBuf },
    /// The target path exists but is not a directory.
    NotADirectory { path: PathBuf },
    /// The target directory is not readable.
    PermissionDenied { path: PathBuf, source: io::Error },
    /// Listing the target directory failed for another reason.
    ReadDirFailed { path: PathBuf, source: io::Error },
    /// A category subdirectory could not be created.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Appending to the audit log failed.
    AuditWriteFailed { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDirectorySelected => write!(f, "No directory selected"),
            Self::TargetNotFound { path } => {
                write!(f, "Directory not found: {}", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Not a directory: {}", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(f, "Permission denied for {}: {}", path.display(), source)
            }
            Self::ReadDirFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create category directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::AuditWriteFailed { path, source } => {
                write!(
                    f,
                    "Failed to write audit log {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for engine operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// A file left in place because its destination was already occupied.
#[derive(Debug, Clone)]
pub struct Collision {
    /// Base name of the file that was not moved.
    pub file_name: String,
    /// The category whose folder already held a file of that name.
    pub category: String,
}

/// What one run did (or, in preview mode, would do).
#[derive(Debug)]
pub struct RunReport {
    /// Files moved, or in preview mode files that would move.
    /// Collisions and failures are not counted.
    pub processed: usize,
    /// Eligible files found in the directory.
    pub total: usize,
    /// True if this was a preview run.
    pub preview: bool,
    /// Files skipped because their destination was occupied.
    pub collisions: Vec<Collision>,
    /// Files whose move failed outright, with the reason.
    pub failures: Vec<(String, String)>,
}

/// Terminal outcome of a run.
#[derive(Debug)]
pub enum RunOutcome {
    /// The directory held no eligible files; nothing was created or moved.
    NothingToDo,
    /// The run completed; per-file details are in the report.
    Completed(RunReport),
}

/// Terminal outcome of an undo request.
#[derive(Debug)]
pub enum UndoOutcome {
    /// No batch is retained (never ran, already undone, or nothing landed).
    NothingToUndo,
    /// The restore pass ran; counts are in the report.
    Restored(UndoReport),
}

/// The classification/move engine.
///
/// All mutable state lives here: the selected directory and the retained
/// batch of the most recent run. Instances are independent, so separate
/// directories can be organized by separate engines without interference.
pub struct Organizer {
    rules: CategoryRules,
    audit: AuditLog,
    excludes: ExcludeMatcher,
    overwrite: bool,
    target: Option<PathBuf>,
    last_batch: Option<RunBatch>,
}

impl Organizer {
    /// Creates an engine with the given rules and audit log, no exclusions,
    /// and the collision-skip policy.
    pub fn new(rules: CategoryRules, audit: AuditLog) -> Self {
        Self {
            rules,
            audit,
            excludes: ExcludeMatcher::default(),
            overwrite: false,
            target: None,
            last_batch: None,
        }
    }

    /// Sets the collision policy. With `overwrite` on, an occupied
    /// destination is replaced instead of skipped.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Installs compiled exclusion rules.
    pub fn with_excludes(mut self, excludes: ExcludeMatcher) -> Self {
        self.excludes = excludes;
        self
    }

    /// Selects the directory subsequent runs operate on.
    ///
    /// Validates that the path exists and is a directory, so a bad selection
    /// fails here rather than on the first run.
    pub fn select_directory(&mut self, path: &Path) -> OrganizeResult<()> {
        let metadata = fs::metadata(path).map_err(|e| Self::target_error(path, e))?;
        if !metadata.is_dir() {
            return Err(OrganizeError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        self.target = Some(path.to_path_buf());
        Ok(())
    }

    /// The currently selected directory, if any.
    pub fn selected_directory(&self) -> Option<&Path> {
        self.target.as_deref()
    }

    /// Location of the audit log.
    pub fn log_path(&self) -> &Path {
        self.audit.path()
    }

    /// The retained batch of the most recent run, if one is held.
    pub fn last_batch(&self) -> Option<&RunBatch> {
        self.last_batch.as_ref()
    }

    /// Organizes the selected directory.
    ///
    /// Eligible files are the directory's direct children that are regular
    /// files, minus the reserved `.log` suffix and any configured exclusions.
    /// Each is classified and moved into `target/<category>` (created on
    /// demand); in preview mode the category folders are still created but no
    /// file is touched. `progress` is called after every file with
    /// `(files_handled_so_far, total)`.
    ///
    /// A collision (destination occupied, overwrite off) or a failed move
    /// skips that one file and the run continues. Directory-level problems
    /// abort before any file is touched.
    pub fn run(
        &mut self,
        preview: bool,
        progress: &mut dyn FnMut(usize, usize),
    ) -> OrganizeResult<RunOutcome> {
        // Every invocation forfeits the previous batch, even one that goes
        // on to fail or find nothing. Undo is single-level.
        self.last_batch = None;

        let target = match &self.target {
            Some(path) => path.clone(),
            None => return Err(OrganizeError::NoDirectorySelected),
        };

        let entries =
            fs::read_dir(&target).map_err(|e| Self::target_error(&target, e))?;

        let mut eligible: Vec<(String, PathBuf)> = Vec::new();
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if !file_type.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(LOG_SUFFIX) || self.excludes.excludes(&name) {
                continue;
            }
            eligible.push((name, entry.path()));
        }

        if eligible.is_empty() {
            return Ok(RunOutcome::NothingToDo);
        }

        let total = eligible.len();
        let mut batch = RunBatch::new(preview);
        let mut report = RunReport {
            processed: 0,
            total,
            preview,
            collisions: Vec::new(),
            failures: Vec::new(),
        };

        for (index, (name, path)) in eligible.iter().enumerate() {
            let category = classify(name, &self.rules).to_string();
            let destination_dir = target.join(&category);
            fs::create_dir_all(&destination_dir).map_err(|e| {
                OrganizeError::DirectoryCreationFailed {
                    path: destination_dir.clone(),
                    source: e,
                }
            })?;

            let mut landed = true;
            if !preview {
                let destination = destination_dir.join(name);
                if destination.exists() && !self.overwrite {
                    self.audit
                        .record_collision(name, &category)
                        .map_err(|e| self.audit_error(e))?;
                    report.collisions.push(Collision {
                        file_name: name.clone(),
                        category: category.clone(),
                    });
                    landed = false;
                } else if let Err(e) = fs::rename(path, &destination) {
                    self.audit
                        .record_move_failure(name, &category, &e.to_string())
                        .map_err(|e| self.audit_error(e))?;
                    report.failures.push((name.clone(), e.to_string()));
                    landed = false;
                }
            }

            if landed {
                self.audit
                    .record_processed(preview, name, &category)
                    .map_err(|e| self.audit_error(e))?;
                batch.push(MoveRecord {
                    original_path: path.clone(),
                    destination_dir,
                    category,
                });
                report.processed += 1;
            }

            progress(index + 1, total);
        }

        self.last_batch = Some(batch);
        Ok(RunOutcome::Completed(report))
    }

    /// Reverses the retained batch, restoring prior file locations.
    ///
    /// A missing or empty batch is the nothing-to-undo outcome, not an
    /// error. The batch is consumed either way, so a second call cannot
    /// double-reverse. Restoration is best-effort: records whose file is no
    /// longer at the recorded destination are skipped silently.
    pub fn undo(&mut self) -> OrganizeResult<UndoOutcome> {
        let Some(batch) = self.last_batch.take() else {
            return Ok(UndoOutcome::NothingToUndo);
        };
        if batch.is_empty() {
            return Ok(UndoOutcome::NothingToUndo);
        }

        let report = undo::restore_batch(&batch);
        self.audit
            .record_undo(report.restored, report.skipped)
            .map_err(|e| self.audit_error(e))?;

        Ok(UndoOutcome::Restored(report))
    }

    fn target_error(path: &Path, source: io::Error) -> OrganizeError {
        match source.kind() {
            io::ErrorKind::NotFound => OrganizeError::TargetNotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => OrganizeError::PermissionDenied {
                path: path.to_path_buf(),
                source,
            },
            io::ErrorKind::NotADirectory => OrganizeError::NotADirectory {
                path: path.to_path_buf(),
            },
            _ => OrganizeError::ReadDirFailed {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    fn audit_error(&self, source: io::Error) -> OrganizeError {
        OrganizeError::AuditWriteFailed {
            path: self.audit.path().to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn organizer_for(log_dir: &Path) -> Organizer {
        Organizer::new(
            CategoryRules::default_set(),
            AuditLog::new(log_dir.join("sortify.log")),
        )
    }

    fn no_progress() -> impl FnMut(usize, usize) {
        |_, _| {}
    }

    #[test]
    fn test_run_without_selection_fails() {
        let logs = TempDir::new().expect("Failed to create temp directory");
        let mut organizer = organizer_for(logs.path());

        let result = organizer.run(false, &mut no_progress());
        assert!(matches!(result, Err(OrganizeError::NoDirectorySelected)));
    }

    #[test]
    fn test_select_missing_directory_fails() {
        let logs = TempDir::new().expect("Failed to create temp directory");
        let mut organizer = organizer_for(logs.path());

        let result = organizer.select_directory(Path::new("/no/such/directory"));
        assert!(matches!(result, Err(OrganizeError::TargetNotFound { .. })));
    }

    #[test]
    fn test_select_file_as_directory_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("plain.txt");
        fs::write(&file, "data").expect("Failed to write file");

        let mut organizer = organizer_for(temp_dir.path());
        let result = organizer.select_directory(&file);
        assert!(matches!(result, Err(OrganizeError::NotADirectory { .. })));
    }

    #[test]
    fn test_empty_directory_is_nothing_to_do() {
        let target = TempDir::new().expect("Failed to create temp directory");
        let logs = TempDir::new().expect("Failed to create temp directory");

        let mut organizer = organizer_for(logs.path());
        organizer
            .select_directory(target.path())
            .expect("Select should succeed");

        let outcome = organizer
            .run(false, &mut no_progress())
            .expect("Run should succeed");
        assert!(matches!(outcome, RunOutcome::NothingToDo));
        assert!(organizer.last_batch().is_none());
    }

    #[test]
    fn test_log_suffix_files_are_not_candidates() {
        let target = TempDir::new().expect("Failed to create temp directory");
        let logs = TempDir::new().expect("Failed to create temp directory");
        fs::write(target.path().join("sortify.log"), "audit").expect("Failed to write file");
        fs::write(target.path().join("old.log"), "text").expect("Failed to write file");

        let mut organizer = organizer_for(logs.path());
        organizer
            .select_directory(target.path())
            .expect("Select should succeed");

        let outcome = organizer
            .run(false, &mut no_progress())
            .expect("Run should succeed");
        assert!(matches!(outcome, RunOutcome::NothingToDo));
        assert!(target.path().join("old.log").exists());
    }

    #[test]
    fn test_collision_skips_file_and_continues() {
        let target = TempDir::new().expect("Failed to create temp directory");
        let logs = TempDir::new().expect("Failed to create temp directory");

        fs::create_dir(target.path().join("Images")).expect("Failed to create directory");
        fs::write(target.path().join("Images").join("a.jpg"), "old")
            .expect("Failed to write file");
        fs::write(target.path().join("a.jpg"), "new").expect("Failed to write file");
        fs::write(target.path().join("b.pdf"), "pdf").expect("Failed to write file");

        let mut organizer = organizer_for(logs.path());
        organizer
            .select_directory(target.path())
            .expect("Select should succeed");

        let outcome = organizer
            .run(false, &mut no_progress())
            .expect("Run should succeed");
        let RunOutcome::Completed(report) = outcome else {
            panic!("Expected a completed run");
        };

        assert_eq!(report.processed, 1);
        assert_eq!(report.collisions.len(), 1);
        assert_eq!(report.collisions[0].file_name, "a.jpg");
        // The colliding file stays put; the other file still moved.
        assert!(target.path().join("a.jpg").exists());
        assert!(target.path().join("PDF").join("b.pdf").exists());
    }

    #[test]
    fn test_overwrite_policy_replaces_destination() {
        let target = TempDir::new().expect("Failed to create temp directory");
        let logs = TempDir::new().expect("Failed to create temp directory");

        fs::create_dir(target.path().join("Images")).expect("Failed to create directory");
        fs::write(target.path().join("Images").join("a.jpg"), "old")
            .expect("Failed to write file");
        fs::write(target.path().join("a.jpg"), "new").expect("Failed to write file");

        let mut organizer = organizer_for(logs.path()).with_overwrite(true);
        organizer
            .select_directory(target.path())
            .expect("Select should succeed");

        let outcome = organizer
            .run(false, &mut no_progress())
            .expect("Run should succeed");
        let RunOutcome::Completed(report) = outcome else {
            panic!("Expected a completed run");
        };

        assert_eq!(report.processed, 1);
        assert!(report.collisions.is_empty());
        let content = fs::read_to_string(target.path().join("Images").join("a.jpg"))
            .expect("Failed to read file");
        assert_eq!(content, "new");
    }

    #[test]
    fn test_progress_reports_every_file() {
        let target = TempDir::new().expect("Failed to create temp directory");
        let logs = TempDir::new().expect("Failed to create temp directory");
        fs::write(target.path().join("a.jpg"), "1").expect("Failed to write file");
        fs::write(target.path().join("b.pdf"), "2").expect("Failed to write file");
        fs::write(target.path().join("c.xyz"), "3").expect("Failed to write file");

        let mut organizer = organizer_for(logs.path());
        organizer
            .select_directory(target.path())
            .expect("Select should succeed");

        let mut ticks: Vec<(usize, usize)> = Vec::new();
        organizer
            .run(true, &mut |done, total| ticks.push((done, total)))
            .expect("Run should succeed");

        assert_eq!(ticks.len(), 3);
        assert!(ticks.iter().all(|&(_, total)| total == 3));
        assert_eq!(ticks.last(), Some(&(3, 3)));
    }

    #[test]
    fn test_undo_without_run_is_nothing_to_undo() {
        let logs = TempDir::new().expect("Failed to create temp directory");
        let mut organizer = organizer_for(logs.path());

        let outcome = organizer.undo().expect("Undo should succeed");
        assert!(matches!(outcome, UndoOutcome::NothingToUndo));
    }

    #[test]
    fn test_undo_consumes_the_batch() {
        let target = TempDir::new().expect("Failed to create temp directory");
        let logs = TempDir::new().expect("Failed to create temp directory");
        fs::write(target.path().join("a.jpg"), "1").expect("Failed to write file");

        let mut organizer = organizer_for(logs.path());
        organizer
            .select_directory(target.path())
            .expect("Select should succeed");
        organizer
            .run(false, &mut no_progress())
            .expect("Run should succeed");

        let first = organizer.undo().expect("Undo should succeed");
        assert!(matches!(first, UndoOutcome::Restored(_)));

        let second = organizer.undo().expect("Undo should succeed");
        assert!(matches!(second, UndoOutcome::NothingToUndo));
    }

    #[test]
    fn test_undo_of_preview_restores_zero() {
        let target = TempDir::new().expect("Failed to create temp directory");
        let logs = TempDir::new().expect("Failed to create temp directory");
        fs::write(target.path().join("a.jpg"), "1").expect("Failed to write file");

        let mut organizer = organizer_for(logs.path());
        organizer
            .select_directory(target.path())
            .expect("Select should succeed");
        organizer
            .run(true, &mut no_progress())
            .expect("Run should succeed");

        let outcome = organizer.undo().expect("Undo should succeed");
        let UndoOutcome::Restored(report) = outcome else {
            panic!("Expected a restore pass");
        };
        assert_eq!(report.restored, 0);
        assert!(target.path().join("a.jpg").exists());
    }
}
