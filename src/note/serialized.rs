//! The server's flat-text note format.
//!
//! ```text
//! <title>
//!
//! <body, any number of lines>
//!
//! id: 0123...
//! parent_id: 4567...
//! ...
//! type_: 1
//! ```
//!
//! The format has no escaping, so the metadata block is located by scanning
//! backward for the last `type_:` line and extending upward over lines shaped
//! like `key: value`. Unknown keys are written after `type_`, so the block
//! also extends downward over trailing `key: value` lines.
//!
//! The downward extension goes beyond the server's own parser, which stops at
//! the `type_:` line. Keep it: without it, extra keys written by
//! [`serialize_note`] are dropped on the next parse and a push would discard
//! them. A body containing a literal `type_:` line after its last metadata
//! block is ambiguous and will be misread.

use std::sync::LazyLock;

use regex::Regex;

use super::{Note, NoteMetadata, NOTE_TYPE_MARKER};
use crate::error::{Result, SyncError};

static META_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+:\s?.*$").unwrap());

const TYPE_PREFIX: &str = "type_:";

/// Parse serialized note text into title, body and metadata.
pub fn parse_serialized_note(text: &str) -> Result<Note> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return Err(SyncError::Format("Empty note content".to_string()));
    }

    let type_idx = lines
        .iter()
        .rposition(|line| line.starts_with(TYPE_PREFIX))
        .ok_or_else(|| {
            SyncError::Format("Cannot find metadata block (type_) in note content".to_string())
        })?;

    let mut meta_start = type_idx;
    while meta_start > 0 && META_LINE_RE.is_match(lines[meta_start - 1]) {
        meta_start -= 1;
    }
    let mut meta_end = type_idx;
    while meta_end + 1 < lines.len() && META_LINE_RE.is_match(lines[meta_end + 1]) {
        meta_end += 1;
    }

    let metadata = lines[meta_start..=meta_end]
        .iter()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim(), value.trim_start_matches(' ')))
        .collect::<NoteMetadata>();

    let title = lines[0].to_string();

    // Tolerate a missing blank line between title and body
    let body_start = if lines.len() >= 2 && lines[1].is_empty() {
        2
    } else {
        1
    };
    let mut body_end = meta_start;
    if body_end > body_start && lines[body_end - 1].is_empty() {
        body_end -= 1;
    }
    let body = if body_end > body_start {
        lines[body_start..body_end].join("\n")
    } else {
        String::new()
    };

    Ok(Note {
        title,
        body,
        metadata,
    })
}

/// Serialize a note in the server's format.
///
/// `type_` is always forced to the note marker. Unknown metadata keys are
/// written after the known ones in sorted order, so their original position
/// is not preserved.
pub fn serialize_note(title: &str, body: &str, metadata: &NoteMetadata) -> String {
    let mut meta = metadata.clone();
    meta.set("type_", NOTE_TYPE_MARKER);

    let mut lines = vec![title.to_string(), String::new(), body.to_string(), String::new()];
    lines.extend(
        meta.canonical_fields()
            .map(|(key, value)| format!("{}: {}", key, value)),
    );

    lines.join("\n")
}

impl Note {
    pub fn parse(text: &str) -> Result<Self> {
        parse_serialized_note(text)
    }

    pub fn serialize(&self) -> String {
        serialize_note(&self.title, &self.body, &self.metadata)
    }
}
