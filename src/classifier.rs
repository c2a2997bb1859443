//! Extension-based file classification.
//!
//! Maps a file name to a category name using an ordered rule set. The lookup
//! is pure and total: every name resolves to some category, with
//! [`OTHERS_CATEGORY`] as the fallback for unmatched or missing extensions.

use crate::rules::CategoryRules;
use std::path::Path;

/// The reserved catch-all category for files no rule claims.
pub const OTHERS_CATEGORY: &str = "Others";

/// Resolves the destination category for `filename`.
///
/// The extension is compared lowercase with its leading dot, so matching is
/// case-insensitive. Rules are consulted in their defined order and the first
/// category listing the extension wins; files without an extension classify
/// straight to [`OTHERS_CATEGORY`].
///
/// # Examples
///
/// ```
/// use sortify::classifier::{classify, OTHERS_CATEGORY};
/// use sortify::rules::CategoryRules;
///
/// let rules = CategoryRules::default_set();
/// assert_eq!(classify("photo.JPG", &rules), "Images");
/// assert_eq!(classify("notes", &rules), OTHERS_CATEGORY);
/// ```
pub fn classify<'r>(filename: &str, rules: &'r CategoryRules) -> &'r str {
    let Some(extension) = file_extension(filename) else {
        return OTHERS_CATEGORY;
    };

    for rule in rules.iter() {
        if rule.extensions.contains(&extension) {
            return &rule.name;
        }
    }

    OTHERS_CATEGORY
}

/// Lowercased extension of `filename`, leading dot included.
///
/// Returns `None` for names with no extension, including dotfiles like
/// `.gitignore`.
fn file_extension(filename: &str) -> Option<String> {
    let extension = Path::new(filename).extension()?;
    Some(format!(".{}", extension.to_string_lossy().to_lowercase()))
}
