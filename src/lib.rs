//! sortify - sort files into category subdirectories by extension
//!
//! This library classifies the files of a single directory into category
//! subfolders using an ordered, configurable extension table, supports a
//! preview mode that reports what would move without touching anything, and
//! can reverse the most recent pass from an in-process undo log.

pub mod audit;
pub mod classifier;
pub mod cli;
pub mod organizer;
pub mod output;
pub mod rules;
pub mod settings;
pub mod undo;

pub use audit::AuditLog;
pub use classifier::{OTHERS_CATEGORY, classify};
pub use organizer::{
    Collision, OrganizeError, OrganizeResult, Organizer, RunOutcome, RunReport, UndoOutcome,
};
pub use rules::{CategoryRule, CategoryRules, RulesError};
pub use settings::{ExcludeMatcher, Settings, SettingsError};
pub use undo::{MoveRecord, RunBatch, UndoReport};
