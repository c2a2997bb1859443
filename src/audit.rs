//! Append-only audit log.
//!
//! One human-readable line per processed file, in the form
//! `<timestamp> - <PREVIEW|MOVED> <file> → <category>`, plus `SKIPPED` lines
//! for per-file collisions and a single `UNDO` summary line per undo pass.
//! The log is never truncated; rotation is out of scope.

use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File-name suffix reserved for the engine's own log artifacts. Files
/// carrying it are never candidates for organization.
pub const LOG_SUFFIX: &str = ".log";

/// Writer handle for the audit log file.
///
/// Single writer, append-only. The file and its parent directories are
/// created on first append.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Creates a handle writing to `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The well-known log location: `$HOME/.config/sortify/sortify.log`,
    /// falling back to the current directory when `HOME` is unset.
    pub fn default_path() -> PathBuf {
        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home)
                .join(".config")
                .join("sortify")
                .join("sortify.log"),
            Err(_) => PathBuf::from("sortify.log"),
        }
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records one processed file, tagged `PREVIEW` or `MOVED`.
    pub fn record_processed(
        &self,
        preview: bool,
        file_name: &str,
        category: &str,
    ) -> io::Result<()> {
        let tag = if preview { "PREVIEW" } else { "MOVED" };
        self.append(&format!("{} {} → {}", tag, file_name, category))
    }

    /// Records a file skipped because its destination was already occupied.
    pub fn record_collision(&self, file_name: &str, category: &str) -> io::Result<()> {
        self.append(&format!(
            "SKIPPED {} → {} (destination occupied)",
            file_name, category
        ))
    }

    /// Records a file skipped because the move itself failed.
    pub fn record_move_failure(
        &self,
        file_name: &str,
        category: &str,
        reason: &str,
    ) -> io::Result<()> {
        self.append(&format!("SKIPPED {} → {} ({})", file_name, category, reason))
    }

    /// Records the summary of one undo pass.
    pub fn record_undo(&self, restored: usize, skipped: usize) -> io::Result<()> {
        self.append(&format!(
            "UNDO completed: {} restored, {} skipped",
            restored, skipped
        ))
    }

    fn append(&self, message: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "{} - {}", timestamp, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_appends_tagged_lines() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log = AuditLog::new(temp_dir.path().join("sortify.log"));

        log.record_processed(false, "a.jpg", "Images")
            .expect("Append should succeed");
        log.record_processed(true, "b.pdf", "PDF")
            .expect("Append should succeed");
        log.record_undo(1, 0).expect("Append should succeed");

        let content = fs::read_to_string(log.path()).expect("Failed to read log");
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("MOVED a.jpg → Images"));
        assert!(lines[1].contains("PREVIEW b.pdf → PDF"));
        assert!(lines[2].contains("UNDO completed: 1 restored, 0 skipped"));
    }

    #[test]
    fn test_never_truncates() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log = AuditLog::new(temp_dir.path().join("sortify.log"));

        log.record_processed(false, "first.txt", "Documents")
            .expect("Append should succeed");

        // A second handle on the same path keeps appending.
        let reopened = AuditLog::new(log.path().to_path_buf());
        reopened
            .record_processed(false, "second.txt", "Documents")
            .expect("Append should succeed");

        let content = fs::read_to_string(log.path()).expect("Failed to read log");
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("first.txt"));
        assert!(content.contains("second.txt"));
    }

    #[test]
    fn test_creates_parent_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log = AuditLog::new(temp_dir.path().join("logs").join("sortify.log"));

        log.record_collision("a.jpg", "Images")
            .expect("Append should succeed");

        let content = fs::read_to_string(log.path()).expect("Failed to read log");
        assert!(content.contains("SKIPPED a.jpg → Images (destination occupied)"));
    }
}
