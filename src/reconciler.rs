//! # Reconciler
//!
//! Merges the parsed `.env` lines with secrets fetched from the store.
//!
//! ## Merge Rules
//!
//! 1. Store values take precedence over local values for the same key
//! 2. Keys that only exist locally are kept with their local value
//! 3. Overwriting a local value that carries an inline comment is refused
//! 4. Comments stay at their original position when it still fits; assignments
//!    fill the remaining slots (existing keys first, then new store keys)
//!
//! The reconciler is pure: it never touches the filesystem.

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use tracing::debug;

use crate::error::SyncError;
use crate::parser::{EnvLine, LineKind};

/// Secrets fetched from the store, ordered by key
pub type SecretMap = BTreeMap<String, String>;

/// Where the final value of a merged key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    FromStoreOnly,
    FromLocalOnly,
    OverwrittenByStore,
}

/// A key with its final value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedEntry {
    pub key: String,
    pub value: String,
    pub origin: Origin,
}

/// One output line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergedLine {
    Comment(String),
    Entry(MergedEntry),
}

/// Ordered result of a reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedFile {
    lines: Vec<MergedLine>,
}

impl MergedFile {
    pub fn lines(&self) -> &[MergedLine] {
        &self.lines
    }

    /// True when there is nothing to write
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &MergedEntry> {
        self.lines.iter().filter_map(|line| match line {
            MergedLine::Entry(entry) => Some(entry),
            MergedLine::Comment(_) => None,
        })
    }

    /// Keys whose value came from the store
    pub fn store_keys(&self) -> Vec<&str> {
        self.entries()
            .filter(|e| e.origin != Origin::FromLocalOnly)
            .map(|e| e.key.as_str())
            .collect()
    }
}

/// Assignments of the existing file, in first-appearance order
///
/// When a key is assigned more than once the last value wins.
#[derive(Debug, Clone, Default)]
pub struct ExistingAssignments {
    order: Vec<String>,
    values: HashMap<String, String>,
}

impl ExistingAssignments {
    pub fn from_lines(lines: &[EnvLine]) -> Self {
        let mut existing = Self::default();
        for line in lines {
            if let LineKind::Assignment { key, value } = &line.kind {
                if existing.values.insert(key.clone(), value.clone()).is_none() {
                    existing.order.push(key.clone());
                } else {
                    debug!("Key {} is assigned more than once, keeping the last value", key);
                }
            }
        }
        existing
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// A value made of one quoted literal and nothing else
static FULLY_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:"[^"]*"|'[^']*')\s*$"#)
        .expect("Failed to compile quoted literal regex - this should never happen")
});

/// A leading token, optional whitespace, then `#` up to the end of the value
///
/// The token is a quoted run (which may span several quotes), a run of
/// characters that are neither whitespace nor `#`, or nothing at all.
static INLINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:".*"|'.*'|[^\s#]*)?\s*(#.*)$"#)
        .expect("Failed to compile inline comment regex - this should never happen")
});

/// Find a trailing `# comment` after the value token
///
/// A value that is exactly one quoted literal never has an inline comment, so
/// `"a # b"` is safe. Anything else is matched as a whole: `"a"b # c` and
/// `'a' 'b' # c` both carry a comment, while `two words # x` does not because
/// the token ends at the first space. An unterminated quote is part of a bare
/// token.
pub fn find_inline_comment(value: &str) -> Option<&str> {
    if FULLY_QUOTED.is_match(value) {
        return None;
    }
    INLINE_COMMENT
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|comment| comment.as_str())
}

/// Merge existing lines with fetched secrets
///
/// `existing` must be built from `lines`; it is shared with the drift report so
/// the file is only folded once. Fails with
/// [`SyncError::InlineCommentConflict`] when a value that the store would
/// overwrite carries an inline comment. An empty result means there is nothing
/// to write.
#[allow(
    clippy::missing_errors_doc,
    reason = "The only failure is documented above"
)]
pub fn reconcile(
    lines: &[EnvLine],
    existing: &ExistingAssignments,
    secrets: &SecretMap,
) -> Result<MergedFile, SyncError> {
    for key in existing.keys().filter(|key| secrets.contains_key(*key)) {
        let value = existing.get(key).unwrap_or_default();
        if find_inline_comment(value).is_some() {
            return Err(SyncError::InlineCommentConflict {
                key: key.to_string(),
            });
        }
    }

    let mut entries = Vec::with_capacity(existing.len() + secrets.len());
    for key in existing.keys() {
        let (value, origin) = match secrets.get(key) {
            Some(stored) => (stored.clone(), Origin::OverwrittenByStore),
            None => (
                existing.get(key).unwrap_or_default().to_string(),
                Origin::FromLocalOnly,
            ),
        };
        entries.push(MergedEntry {
            key: key.to_string(),
            value,
            origin,
        });
    }
    for (key, value) in secrets {
        if !existing.contains(key) {
            entries.push(MergedEntry {
                key: key.clone(),
                value: value.clone(),
                origin: Origin::FromStoreOnly,
            });
        }
    }

    if entries.is_empty() {
        return Ok(MergedFile::default());
    }

    let comments: Vec<(usize, &str)> = lines
        .iter()
        .filter_map(|line| match &line.kind {
            LineKind::Comment { text } => Some((line.position, text.as_str())),
            LineKind::Assignment { .. } => None,
        })
        .collect();

    let total = comments.len() + entries.len();
    let mut placed: Vec<Option<&str>> = vec![None; total];
    let mut displaced = Vec::new();
    for (position, text) in comments {
        match placed.get_mut(position) {
            Some(slot) => *slot = Some(text),
            None => displaced.push(text),
        }
    }

    let mut entries = entries.into_iter();
    let mut displaced = displaced.into_iter();
    let mut merged = Vec::with_capacity(total);
    for slot in placed {
        let line = match slot {
            Some(text) => MergedLine::Comment(text.to_string()),
            None => match entries.next() {
                Some(entry) => MergedLine::Entry(entry),
                None => match displaced.next() {
                    Some(text) => MergedLine::Comment(text.to_string()),
                    None => continue,
                },
            },
        };
        merged.push(line);
    }

    debug!(
        "Merged {} existing keys with {} store keys into {} lines",
        existing.len(),
        secrets.len(),
        merged.len()
    );

    Ok(MergedFile { lines: merged })
}
