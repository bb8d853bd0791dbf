//! PATH-style list deduplication over an explicit environment map.
//!
//! One-line contract: given a PATH-style variable, drop every entry that
//! repeats an earlier one. State lives in an [`EnvMap`] passed by reference,
//! never in ambient process globals.

use std::collections::HashMap;

#[cfg(windows)]
pub const LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const LIST_SEPARATOR: char = ':';

/// Entry key used for duplicate detection: trailing separators ignored,
/// case-insensitive on Windows.
fn entry_key(entry: &str) -> String {
    let trimmed = entry.trim_end_matches(['/', '\\']);
    if cfg!(windows) {
        trimmed.to_ascii_lowercase()
    } else {
        trimmed.to_string()
    }
}

/// Remove duplicate entries from a PATH-style list, keeping the first
/// occurrence of each and the original order. Empty entries are dropped.
pub fn dedupe_path_list(value: &str) -> String {
    let mut seen = std::collections::HashSet::new();
    let mut kept = Vec::new();
    for entry in value.split(LIST_SEPARATOR) {
        if entry.is_empty() {
            continue;
        }
        if seen.insert(entry_key(entry)) {
            kept.push(entry);
        }
    }
    kept.join(&LIST_SEPARATOR.to_string())
}

/// An explicit key-value environment.
#[derive(Debug, Clone, Default)]
pub struct EnvMap {
    vars: HashMap<String, String>,
}

impl EnvMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Dedupe the named variable in place. Returns the number of entries
    /// removed, or None if the variable is unset.
    pub fn dedupe(&mut self, key: &str) -> Option<usize> {
        let value = self.vars.get(key)?;
        let before = value.split(LIST_SEPARATOR).filter(|e| !e.is_empty()).count();
        let deduped = dedupe_path_list(value);
        let after = deduped.split(LIST_SEPARATOR).filter(|e| !e.is_empty()).count();
        self.vars.insert(key.to_string(), deduped);
        Some(before - after)
    }
}
