//! Terminal output styling.
//!
//! All user-facing printing for the CLI lives here; the engine itself never
//! formats or displays anything. Colored one-liners plus an indicatif
//! progress bar fed by the engine's progress callback.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Styled terminal output for the CLI driver.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Success message, green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Error message to stderr, red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Warning message, yellow.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Informational message, cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Unstyled message.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Preview-mode banner line.
    pub fn preview_notice(message: &str) {
        println!("{}", format!("[PREVIEW] {}", message).yellow());
    }

    /// Progress bar sized for `total` files.
    pub fn progress_bar(total: u64) -> ProgressBar {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        bar
    }

    /// Per-category summary of one run, sorted by category name.
    pub fn run_summary(counts: &[(String, usize)], processed: usize, preview: bool) {
        let mut rows: Vec<_> = counts.iter().collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        println!();
        for (category, count) in rows {
            let files = if *count == 1 { "file" } else { "files" };
            println!("  {}: {} {}", category.bold(), count.to_string().green(), files);
        }

        let verb = if preview { "would move" } else { "moved" };
        println!(
            "{} {} {}",
            "Total:".bold(),
            processed.to_string().green().bold(),
            format!("{} {}", if processed == 1 { "file" } else { "files" }, verb),
        );
    }
}
