//! Runtime settings.
//!
//! Settings are optional and live in a TOML file. They carry the collision
//! policy, path overrides for the rules file and audit log, and exclusion
//! rules for files that should never be organized.
//!
//! # File Format
//!
//! ```toml
//! overwrite = false
//! rules_file = "/home/user/.config/sortify/file_types.json"
//! log_file = "/home/user/.config/sortify/sortify.log"
//!
//! [exclude]
//! filenames = ["Thumbs.db", "desktop.ini"]
//! patterns = ["*.tmp"]
//! regex = []
//! ```
//!
//! All keys are optional. With no settings file at all, behavior is the
//! default: collisions skip the file, and only the reserved `.log` suffix is
//! excluded from candidacy.

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors from loading or compiling settings.
#[derive(Debug, Clone)]
pub enum SettingsError {
    /// An explicitly requested settings file does not exist.
    NotFound(PathBuf),
    /// The file is not valid TOML of the expected shape.
    Parse(String),
    /// An exclusion glob pattern failed to compile.
    BadGlob(String),
    /// An exclusion regex failed to compile, with the reason.
    BadRegex { pattern: String, reason: String },
    /// IO failure reading the file.
    Io(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::NotFound(path) => {
                write!(f, "Settings file not found: {}", path.display())
            }
            SettingsError::Parse(msg) => write!(f, "Invalid settings file: {}", msg),
            SettingsError::BadGlob(pattern) => {
                write!(f, "Invalid exclusion glob '{}'", pattern)
            }
            SettingsError::BadRegex { pattern, reason } => {
                write!(f, "Invalid exclusion regex '{}': {}", pattern, reason)
            }
            SettingsError::Io(msg) => write!(f, "IO error reading settings: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Application settings, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Overwrite an occupied destination instead of skipping the file.
    /// Off by default; the safe policy is to skip and report.
    #[serde(default)]
    pub overwrite: bool,

    /// Override for the category rules file location.
    #[serde(default)]
    pub rules_file: Option<PathBuf>,

    /// Override for the audit log location.
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Files that should never be organized.
    #[serde(default)]
    pub exclude: ExcludeRules,
}

/// Exclusion rules, matched against bare file names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names (e.g. "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns (e.g. "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regex patterns, for cases globs cannot express.
    #[serde(default)]
    pub regex: Vec<String>,
}

impl Settings {
    /// Loads settings, trying in order: an explicit path, `./.sortifyrc.toml`,
    /// `$HOME/.config/sortify/config.toml`, then built-in defaults.
    ///
    /// Only an explicitly given path is required to exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        let local = PathBuf::from(".sortifyrc.toml");
        if local.exists() {
            return Self::load_from_file(&local);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sortify")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Err(SettingsError::NotFound(path.to_path_buf()));
        }

        let content =
            fs::read_to_string(path).map_err(|e| SettingsError::Io(e.to_string()))?;

        toml::from_str(&content).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Compiles the exclusion rules into a matcher, validating every pattern.
    pub fn compile_excludes(&self) -> Result<ExcludeMatcher, SettingsError> {
        ExcludeMatcher::new(&self.exclude)
    }
}

/// Pre-compiled exclusion rules.
///
/// Patterns are parsed once here so per-file matching never reparses them.
#[derive(Debug, Default)]
pub struct ExcludeMatcher {
    filenames: HashSet<String>,
    patterns: Vec<Pattern>,
    regexes: Vec<Regex>,
}

impl ExcludeMatcher {
    fn new(rules: &ExcludeRules) -> Result<Self, SettingsError> {
        let patterns = rules
            .patterns
            .iter()
            .map(|p| Pattern::new(p).map_err(|_| SettingsError::BadGlob(p.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let regexes = rules
            .regex
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| SettingsError::BadRegex {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            filenames: rules.filenames.iter().cloned().collect(),
            patterns,
            regexes,
        })
    }

    /// True if `file_name` is excluded from organization.
    pub fn excludes(&self, file_name: &str) -> bool {
        if self.filenames.contains(file_name) {
            return true;
        }
        if self.patterns.iter().any(|p| p.matches(file_name)) {
            return true;
        }
        self.regexes.iter().any(|r| r.is_match(file_name))
    }
}
