//! Note data model shared by the server codec and the markdown working copy.

mod markdown;
mod serialized;

pub use markdown::{
    parse_markdown, parse_markdown_file, render_markdown, write_markdown_file, FrontMatter,
};
pub use serialized::{parse_serialized_note, serialize_note};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Result, SyncError};

/// Value of `type_` for notes.
pub const NOTE_TYPE_MARKER: &str = "1";

/// Canonical order in which the server writes known metadata fields.
pub const META_ORDER: [&str; 29] = [
    "id",
    "parent_id",
    "created_time",
    "updated_time",
    "is_conflict",
    "latitude",
    "longitude",
    "altitude",
    "author",
    "source_url",
    "is_todo",
    "todo_due",
    "todo_completed",
    "source",
    "source_application",
    "application_data",
    "order",
    "user_created_time",
    "user_updated_time",
    "encryption_cipher_text",
    "encryption_applied",
    "markup_language",
    "is_shared",
    "share_id",
    "conflict_original_id",
    "master_key_id",
    "user_data",
    "deleted_time",
    "type_",
];

/// Metadata block of a serialized note.
///
/// Lookup is by key; iteration via [`NoteMetadata::canonical_fields`] yields
/// known fields in [`META_ORDER`] followed by unknown fields sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteMetadata {
    fields: BTreeMap<String, String>,
}

impl NoteMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata for a brand-new note, with every field at the server's zero value.
    pub fn for_new_note(note_id: &str, parent_id: &str, now: &str) -> Self {
        let mut meta = Self::new();
        let defaults = [
            ("id", note_id),
            ("parent_id", parent_id),
            ("created_time", now),
            ("updated_time", now),
            ("is_conflict", "0"),
            ("latitude", "0.00000000"),
            ("longitude", "0.00000000"),
            ("altitude", "0.0000"),
            ("author", ""),
            ("source_url", ""),
            ("is_todo", "0"),
            ("todo_due", "0"),
            ("todo_completed", "0"),
            ("source", "joplin-server-api"),
            ("source_application", "net.cozic.joplin-desktop"),
            ("application_data", ""),
            ("order", "0"),
            ("user_created_time", now),
            ("user_updated_time", now),
            ("encryption_cipher_text", ""),
            ("encryption_applied", "0"),
            ("markup_language", "1"),
            ("is_shared", "0"),
            ("share_id", ""),
            ("conflict_original_id", ""),
            ("master_key_id", ""),
            ("user_data", ""),
            ("deleted_time", "0"),
            ("type_", NOTE_TYPE_MARKER),
        ];
        for (key, value) in defaults {
            meta.set(key, value);
        }
        meta
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Stamp the fields a push owns, leaving every other field untouched.
    pub fn stamp_push(&mut self, note_id: &str, parent_id: &str, now: &str) {
        self.set("id", note_id);
        self.set("parent_id", parent_id);
        self.set("updated_time", now);
        self.set("user_updated_time", now);
    }

    /// Fields in serialization order.
    pub fn canonical_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        let known = META_ORDER
            .iter()
            .filter_map(|key| self.fields.get_key_value(*key));
        // BTreeMap iteration is already sorted by key
        let extra = self
            .fields
            .iter()
            .filter(|(key, _)| !META_ORDER.contains(&key.as_str()));
        known
            .chain(extra)
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NoteMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut meta = Self::new();
        for (key, value) in iter {
            meta.set(key, value);
        }
        meta
    }
}

/// A note as stored on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub title: String,
    pub body: String,
    pub metadata: NoteMetadata,
}

impl Note {
    pub fn id(&self) -> Option<&str> {
        self.metadata.get("id")
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.metadata.get("parent_id")
    }
}

/// Titles occupy the first line of a serialized note.
pub fn validate_title(title: &str) -> Result<()> {
    if title.contains(['\n', '\r']) {
        return Err(SyncError::MultiLineTitle(title.to_string()));
    }
    Ok(())
}

/// Generate a fresh note id: 32 lowercase hex characters.
pub fn generate_note_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Format a timestamp the way the server stores them, e.g. `2024-01-15T10:30:00.123Z`.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub fn utc_now_timestamp() -> String {
    format_timestamp(&Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_generate_note_id_is_32_lowercase_hex() {
        let id = generate_note_id();
        assert_eq!(id.len(), 32);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_ne!(id, generate_note_id());
    }

    #[test]
    fn test_format_timestamp_millis_with_z() {
        let dt = Utc
            .with_ymd_and_hms(2024, 1, 15, 10, 30, 0)
            .unwrap()
            .with_nanosecond(7_000_000)
            .unwrap();
        assert_eq!(format_timestamp(&dt), "2024-01-15T10:30:00.007Z");
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Shopping list").is_ok());
        assert!(validate_title("").is_ok());
        assert!(matches!(
            validate_title("two\nlines"),
            Err(SyncError::MultiLineTitle(_))
        ));
        assert!(validate_title("carriage\rreturn").is_err());
    }

    #[test]
    fn test_canonical_fields_order() {
        let meta: NoteMetadata = [
            ("zeta", "z"),
            ("type_", "1"),
            ("alpha", "a"),
            ("parent_id", "p"),
            ("id", "i"),
        ]
        .into_iter()
        .collect();

        let keys: Vec<&str> = meta.canonical_fields().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["id", "parent_id", "type_", "alpha", "zeta"]);
    }

    #[test]
    fn test_for_new_note_defaults() {
        let meta = NoteMetadata::for_new_note("abc", "nb1", "2024-01-01T00:00:00.000Z");
        assert_eq!(meta.len(), META_ORDER.len());
        assert_eq!(meta.get("parent_id"), Some("nb1"));
        assert_eq!(meta.get("is_todo"), Some("0"));
        assert_eq!(meta.get("author"), Some(""));
        assert_eq!(meta.get("created_time"), meta.get("updated_time"));
        assert_eq!(meta.get("type_"), Some(NOTE_TYPE_MARKER));
    }

    #[test]
    fn test_stamp_push_only_touches_owned_fields() {
        let mut meta: NoteMetadata = [
            ("id", "old"),
            ("author", "alice"),
            ("created_time", "2020-01-01T00:00:00.000Z"),
        ]
        .into_iter()
        .collect();

        meta.stamp_push("new", "nb", "2024-01-01T00:00:00.000Z");

        assert_eq!(meta.get("id"), Some("new"));
        assert_eq!(meta.get("parent_id"), Some("nb"));
        assert_eq!(meta.get("updated_time"), Some("2024-01-01T00:00:00.000Z"));
        assert_eq!(meta.get("user_updated_time"), Some("2024-01-01T00:00:00.000Z"));
        assert_eq!(meta.get("author"), Some("alice"));
        assert_eq!(meta.get("created_time"), Some("2020-01-01T00:00:00.000Z"));
    }
}
