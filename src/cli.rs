//! Command-line driver.
//!
//! A thin presentation layer over the engine: argument parsing, settings and
//! rules wiring, progress rendering, and outcome messages. The engine never
//! prints; everything user-visible goes through [`OutputFormatter`].
//!
//! Besides one-shot organize/preview invocations there is an interactive
//! menu mode (preview, organize, undo, show log path). Undo history lives
//! only in the running process, so that is how undo is reached from a shell.

use crate::audit::AuditLog;
use crate::organizer::{Organizer, RunOutcome, UndoOutcome};
use crate::output::OutputFormatter;
use crate::rules::CategoryRules;
use crate::settings::Settings;
use clap::Parser;
use indicatif::ProgressBar;
use std::collections::HashMap;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "sortify",
    version,
    about = "Sort files into category subdirectories by extension, with preview and undo."
)]
pub struct Cli {
    /// Directory to organize.
    pub directory: PathBuf,

    /// Show what would move without touching any file.
    #[arg(long, visible_alias = "dry-run")]
    pub preview: bool,

    /// Menu mode: preview, organize, undo, show log path.
    #[arg(short, long, conflicts_with = "preview")]
    pub interactive: bool,

    /// Replace occupied destinations instead of skipping those files.
    #[arg(long)]
    pub overwrite: bool,

    /// Category rules file (JSON mapping of category to extensions).
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Settings file (TOML).
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Audit log file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Builds the engine from arguments and settings, then dispatches.
pub fn run(cli: Cli) -> Result<(), String> {
    let settings = Settings::load(cli.settings.as_deref()).map_err(|e| e.to_string())?;
    let excludes = settings.compile_excludes().map_err(|e| e.to_string())?;

    let rules_path = cli
        .rules
        .clone()
        .or_else(|| settings.rules_file.clone())
        .unwrap_or_else(CategoryRules::default_path);
    let rules = CategoryRules::load(&rules_path).map_err(|e| e.to_string())?;

    let log_path = cli
        .log_file
        .clone()
        .or_else(|| settings.log_file.clone())
        .unwrap_or_else(AuditLog::default_path);

    let mut organizer = Organizer::new(rules, AuditLog::new(log_path))
        .with_overwrite(cli.overwrite || settings.overwrite)
        .with_excludes(excludes);

    organizer
        .select_directory(&cli.directory)
        .map_err(|e| e.to_string())?;

    if cli.interactive {
        interactive_loop(&mut organizer)
    } else {
        organize_once(&mut organizer, cli.preview)?;
        if !cli.preview && io::stdin().is_terminal() && io::stdout().is_terminal() {
            offer_undo(&mut organizer)?;
        }
        Ok(())
    }
}

/// One organize (or preview) pass with a live progress bar.
fn organize_once(organizer: &mut Organizer, preview: bool) -> Result<(), String> {
    let directory = organizer
        .selected_directory()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    if preview {
        OutputFormatter::preview_notice(&format!("Analyzing {}", directory));
    } else {
        OutputFormatter::info(&format!("Organizing {}", directory));
    }

    let mut bar: Option<ProgressBar> = None;
    let outcome = organizer
        .run(preview, &mut |done, total| {
            let bar = bar.get_or_insert_with(|| OutputFormatter::progress_bar(total as u64));
            bar.set_position(done as u64);
        })
        .map_err(|e| e.to_string())?;
    if let Some(bar) = bar.take() {
        bar.finish_and_clear();
    }

    match outcome {
        RunOutcome::NothingToDo => {
            OutputFormatter::info("No files to organize.");
        }
        RunOutcome::Completed(report) => {
            for collision in &report.collisions {
                OutputFormatter::warning(&format!(
                    "Skipped {}: {}/ already contains a file of that name",
                    collision.file_name, collision.category
                ));
            }
            for (name, reason) in &report.failures {
                OutputFormatter::error(&format!("Failed to move {}: {}", name, reason));
            }

            OutputFormatter::run_summary(
                &category_counts(organizer),
                report.processed,
                report.preview,
            );
            if report.preview {
                OutputFormatter::success("Preview complete. No files were modified.");
            } else {
                OutputFormatter::success("Files organized.");
            }
        }
    }

    Ok(())
}

/// One undo pass with outcome messages.
fn undo_once(organizer: &mut Organizer) -> Result<(), String> {
    match organizer.undo().map_err(|e| e.to_string())? {
        UndoOutcome::NothingToUndo => {
            OutputFormatter::info("Nothing to undo.");
        }
        UndoOutcome::Restored(report) => {
            let files = if report.restored == 1 { "file" } else { "files" };
            OutputFormatter::success(&format!("Restored {} {}.", report.restored, files));
            if report.skipped > 0 {
                OutputFormatter::warning(&format!(
                    "{} no longer at the recorded destination; skipped",
                    report.skipped
                ));
            }
            for (path, reason) in &report.failed {
                OutputFormatter::error(&format!(
                    "Could not restore {}: {}",
                    path.display(),
                    reason
                ));
            }
        }
    }
    Ok(())
}

/// Asks whether to revert the run just performed. Only called on a terminal.
fn offer_undo(organizer: &mut Organizer) -> Result<(), String> {
    print!("Undo this run? [y/N] ");
    io::stdout().flush().map_err(|e| e.to_string())?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| e.to_string())?;
    if line.trim().eq_ignore_ascii_case("y") {
        undo_once(organizer)?;
    }
    Ok(())
}

/// Menu loop mirroring the operation interface: preview, organize, undo,
/// show log path, quit.
fn interactive_loop(organizer: &mut Organizer) -> Result<(), String> {
    OutputFormatter::plain("Commands: [p]review  [o]rganize  [u]ndo  [l]og path  [q]uit");
    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| e.to_string())?;
        if read == 0 {
            return Ok(());
        }

        match line.trim() {
            "p" | "preview" => organize_once(organizer, true)?,
            "o" | "organize" => organize_once(organizer, false)?,
            "u" | "undo" => undo_once(organizer)?,
            "l" | "log" => {
                OutputFormatter::plain(&organizer.log_path().display().to_string())
            }
            "q" | "quit" => return Ok(()),
            "" => {}
            other => OutputFormatter::warning(&format!("Unknown command '{}'", other)),
        }
    }
}

/// Per-category counts of the most recent batch, for the summary table.
fn category_counts(organizer: &Organizer) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    if let Some(batch) = organizer.last_batch() {
        for record in batch.records() {
            *counts.entry(record.category.clone()).or_insert(0) += 1;
        }
    }
    counts.into_iter().collect()
}
