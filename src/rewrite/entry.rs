//! `KEY=VALUE` parsing and target selection.
//!
//! A line is an entry when it splits on its first `=` into a non-empty
//! key and a non-empty value.  Keys and values are kept byte-for-byte
//! (no trimming, no quote stripping) so a rewritten line can be found
//! again by its exact `KEY=` prefix.  Comment lines are never entries.

use std::collections::HashSet;

/// One `KEY=VALUE` line found in a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    /// Zero-based index of the line it came from.
    pub line: usize,
    pub key: String,
    pub value: String,
}

/// Parse a single line into a (key, value) pair.
///
/// Returns `None` for comments, lines without `=`, and lines whose key
/// or value is empty.  Everything after the first `=` is the value.
pub fn parse_entry(line: &str) -> Option<(&str, &str)> {
    if line.trim_start().starts_with('#') {
        return None;
    }

    let (key, value) = line.split_once('=')?;
    if key.trim().is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Extract all entries from `lines`, in file order.
pub fn extract_entries(lines: &[String]) -> Vec<ConfigEntry> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(line, text)| {
            parse_entry(text).map(|(key, value)| ConfigEntry {
                line,
                key: key.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

/// The entries chosen for transformation plus any lookups that matched
/// nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub targets: Vec<ConfigEntry>,
    pub unresolved: Vec<String>,
}

/// Choose which entries to transform.
///
/// With `lookups`, each one resolves by exact key first, then by exact
/// value; the first matching entry wins.  Without `lookups`, every
/// entry is a target, duplicate keys included.  A line is targeted at
/// most once.
pub fn select_targets(entries: &[ConfigEntry], lookups: Option<&[String]>) -> Selection {
    let Some(lookups) = lookups else {
        return Selection {
            targets: entries.to_vec(),
            unresolved: Vec::new(),
        };
    };

    let mut selection = Selection::default();
    let mut seen = HashSet::new();

    for lookup in lookups {
        let found = entries
            .iter()
            .find(|e| e.key == *lookup)
            .or_else(|| entries.iter().find(|e| e.value == *lookup));

        match found {
            Some(entry) => {
                if seen.insert(entry.line) {
                    selection.targets.push(entry.clone());
                }
            }
            None => selection.unresolved.push(lookup.clone()),
        }
    }

    selection
}
