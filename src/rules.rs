//! Category rule loading.
//!
//! Rules live in a JSON document mapping category names to lists of file
//! extensions (each with a leading dot). Document order is rule order: the
//! first category listing an extension wins, and later categories are never
//! consulted for it. When the file is missing a built-in default table is
//! written out and used; a file that exists but does not have the expected
//! shape is a hard startup error.

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// The default category table written when no rules file exists.
const DEFAULT_RULES: &[(&str, &[&str])] = &[
    ("Images", &[".jpg", ".jpeg", ".png", ".gif"]),
    ("Documents", &[".doc", ".docx", ".txt"]),
    ("PDF", &[".pdf"]),
    ("Videos", &[".mp4", ".avi", ".mkv"]),
    ("Audio", &[".mp3", ".wav"]),
    ("Archives", &[".zip", ".rar"]),
];

/// Errors that can occur while loading or writing the rules file.
#[derive(Debug)]
pub enum RulesError {
    /// IO failure reading an existing rules file.
    ReadFailed { path: PathBuf, source: std::io::Error },
    /// IO failure writing the default rules file.
    WriteDefaultFailed { path: PathBuf, source: std::io::Error },
    /// The rules file exists but is not a JSON mapping of
    /// category name to list of extension strings.
    Malformed { path: PathBuf, reason: String },
}

impl std::fmt::Display for RulesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadFailed { path, source } => {
                write!(f, "Failed to read rules file {}: {}", path.display(), source)
            }
            Self::WriteDefaultFailed { path, source } => {
                write!(
                    f,
                    "Failed to write default rules file {}: {}",
                    path.display(),
                    source
                )
            }
            Self::Malformed { path, reason } => {
                write!(f, "Malformed rules file {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for RulesError {}

/// A single category: a name and the extensions routed to it.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    /// Category name, also the destination subdirectory name.
    pub name: String,
    /// Recognized extensions, lowercase, leading dot included.
    pub extensions: HashSet<String>,
}

/// An ordered set of category rules.
///
/// Immutable once loaded; the backing file may be edited between runs.
#[derive(Debug, Clone)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
}

impl CategoryRules {
    /// Loads rules from `path`.
    ///
    /// If the file does not exist, the default table is written there and
    /// returned. Extensions are lowercased on load, so matching against them
    /// is case-insensitive.
    pub fn load(path: &Path) -> Result<Self, RulesError> {
        if !path.exists() {
            Self::write_default(path)?;
            return Ok(Self::default_set());
        }

        let content = fs::read_to_string(path).map_err(|e| RulesError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let value: Value =
            serde_json::from_str(&content).map_err(|e| RulesError::Malformed {
                path: path.to_path_buf(),
                reason: format!("JSON parse error: {}", e),
            })?;

        Self::from_value(&value).map_err(|reason| RulesError::Malformed {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Builds the built-in default rule set.
    pub fn default_set() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(name, extensions)| CategoryRule {
                name: (*name).to_string(),
                extensions: extensions.iter().map(|e| (*e).to_string()).collect(),
            })
            .collect();
        Self { rules }
    }

    /// The well-known rules file location: `$HOME/.config/sortify/file_types.json`,
    /// falling back to the current directory when `HOME` is unset.
    pub fn default_path() -> PathBuf {
        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home)
                .join(".config")
                .join("sortify")
                .join("file_types.json"),
            Err(_) => PathBuf::from("file_types.json"),
        }
    }

    /// Iterates rules in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryRule> {
        self.rules.iter()
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if no categories are configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validates the document shape: an object whose values are arrays of
    /// strings. Key order in the document becomes rule order.
    fn from_value(value: &Value) -> Result<Self, String> {
        let object = value
            .as_object()
            .ok_or_else(|| "expected a JSON object of category -> extensions".to_string())?;

        let mut rules = Vec::with_capacity(object.len());
        for (name, extensions) in object {
            let array = extensions.as_array().ok_or_else(|| {
                format!("category '{}' must map to a list of extensions", name)
            })?;

            let mut set = HashSet::with_capacity(array.len());
            for entry in array {
                let ext = entry.as_str().ok_or_else(|| {
                    format!("category '{}' contains a non-string extension", name)
                })?;
                set.insert(ext.to_lowercase());
            }

            rules.push(CategoryRule {
                name: name.clone(),
                extensions: set,
            });
        }

        Ok(Self { rules })
    }

    /// Writes the default table as pretty JSON, creating parent directories.
    fn write_default(path: &Path) -> Result<(), RulesError> {
        let mut document = Map::new();
        for (name, extensions) in DEFAULT_RULES {
            let list: Vec<Value> = extensions.iter().map(|e| Value::from(*e)).collect();
            document.insert((*name).to_string(), Value::Array(list));
        }

        let json = serde_json::to_string_pretty(&Value::Object(document)).map_err(|e| {
            RulesError::WriteDefaultFailed {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
            }
        })?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| RulesError::WriteDefaultFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, json).map_err(|e| RulesError::WriteDefaultFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
