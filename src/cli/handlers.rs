use std::path::{Path, PathBuf};

use tracing::info;

use crate::client::Session;
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::note::{
    generate_note_id, parse_markdown_file, utc_now_timestamp, validate_title,
    write_markdown_file, FrontMatter, Note, NoteMetadata,
};

/// Options for `create`.
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub notebook_id: String,
    pub title: String,
    pub body: String,
    pub body_file: Option<PathBuf>,
    pub note_id: Option<String>,
    pub out: Option<PathBuf>,
}

pub fn handle_pull(config: &SyncConfig, note_id: String, out: PathBuf) -> Result<()> {
    let session = config.login()?;
    let pulled_id = pull_note(&session, &note_id, &out)?;

    println!("Pulled note {} to {}", pulled_id, out.display());
    Ok(())
}

pub fn handle_push(
    config: &SyncConfig,
    file: PathBuf,
    note_id: Option<String>,
    title: Option<String>,
) -> Result<()> {
    let session = config.login()?;
    let pushed_id = push_note(&session, &file, note_id.as_deref(), title.as_deref())?;

    println!("Pushed note {}", pushed_id);
    Ok(())
}

pub fn handle_create(config: &SyncConfig, request: CreateRequest) -> Result<()> {
    let session = config.login()?;
    let created_id = create_note(&session, &request)?;

    match &request.out {
        Some(out) => println!("Created note {} and wrote {}", created_id, out.display()),
        None => println!("Created note {}", created_id),
    }
    Ok(())
}

/// Fetch a note and write it as a markdown working copy. Returns the note id.
///
/// Nothing is written unless the fetch and parse both succeed.
pub fn pull_note(session: &Session, note_id: &str, out: &Path) -> Result<String> {
    let note = session.fetch_note(note_id)?;

    let id = note.id().unwrap_or(note_id).to_string();
    let parent_id = note.parent_id().unwrap_or("");
    write_markdown_file(out, &note.title, &note.body, &id, parent_id)?;

    info!(note_id = %id, path = %out.display(), "pulled note");
    Ok(id)
}

/// Push a working copy over the remote note. Returns the note id.
///
/// The remote note is fetched first so that every metadata field survives;
/// only the local title and body plus the four push-owned fields change.
pub fn push_note(
    session: &Session,
    file: &Path,
    note_id_override: Option<&str>,
    title_override: Option<&str>,
) -> Result<String> {
    let (front, body) = parse_markdown_file(file)?;

    let note_id = front
        .note_id()
        .or(note_id_override.filter(|id| !id.is_empty()))
        .ok_or(SyncError::MissingNoteId)?
        .to_string();

    let remote = session.fetch_note(&note_id)?;
    let note = merge_for_push(
        &front,
        &body,
        remote,
        &note_id,
        title_override,
        &utc_now_timestamp(),
    );
    validate_title(&note.title)?;

    session.store_note(&note_id, &note.serialize())?;

    info!(note_id = %note_id, path = %file.display(), "pushed note");
    Ok(note_id)
}

/// Apply a local working copy on top of the remote note.
///
/// Title: front matter, then override, then remote. Parent: front matter,
/// then remote. Local body always wins.
pub fn merge_for_push(
    front: &FrontMatter,
    body: &str,
    remote: Note,
    note_id: &str,
    title_override: Option<&str>,
    now: &str,
) -> Note {
    let title = front
        .title()
        .or(title_override.filter(|t| !t.is_empty()))
        .unwrap_or(remote.title.as_str())
        .to_string();
    let parent_id = front
        .parent_id()
        .or(remote.parent_id())
        .unwrap_or("")
        .to_string();

    let mut metadata = remote.metadata;
    metadata.stamp_push(note_id, &parent_id, now);

    Note {
        title,
        body: body.trim_end_matches('\n').to_string(),
        metadata,
    }
}

/// Create a new note in a notebook. Returns the note id.
pub fn create_note(session: &Session, request: &CreateRequest) -> Result<String> {
    validate_title(&request.title)?;

    let note_id = request
        .note_id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(generate_note_id);

    let body = match &request.body_file {
        Some(path) => {
            let (_front, body) = parse_markdown_file(path)?;
            body.trim_end_matches('\n').to_string()
        }
        None => request.body.clone(),
    };

    let note = new_note(
        &note_id,
        &request.notebook_id,
        &request.title,
        body,
        &utc_now_timestamp(),
    );
    session.store_note(&note_id, &note.serialize())?;
    info!(note_id = %note_id, notebook_id = %request.notebook_id, "created note");

    if let Some(out) = &request.out {
        write_markdown_file(out, &note.title, &note.body, &note_id, &request.notebook_id)?;
    }

    Ok(note_id)
}

pub fn new_note(note_id: &str, notebook_id: &str, title: &str, body: String, now: &str) -> Note {
    Note {
        title: title.to_string(),
        body,
        metadata: NoteMetadata::for_new_note(note_id, notebook_id, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{parse_markdown, parse_serialized_note};

    const NOW: &str = "2024-06-01T12:00:00.000Z";

    fn remote_note() -> Note {
        parse_serialized_note(
            "Remote title\n\nremote body\n\nid: n1\nparent_id: nb-remote\n\
             created_time: 2020-01-01T00:00:00.000Z\nupdated_time: 2020-01-01T00:00:00.000Z\n\
             author: alice\nuser_updated_time: 2020-01-01T00:00:00.000Z\ntype_: 1",
        )
        .unwrap()
    }

    #[test]
    fn test_merge_keeps_remote_metadata() {
        let (front, body) = parse_markdown("---\nnote_id: n1\n---\nlocal body\n");
        let note = merge_for_push(&front, &body, remote_note(), "n1", None, NOW);

        assert_eq!(note.title, "Remote title");
        assert_eq!(note.body, "local body");
        assert_eq!(note.metadata.get("author"), Some("alice"));
        assert_eq!(note.metadata.get("parent_id"), Some("nb-remote"));
        assert_eq!(note.metadata.get("created_time"), Some("2020-01-01T00:00:00.000Z"));
        assert_eq!(note.metadata.get("updated_time"), Some(NOW));
        assert_eq!(note.metadata.get("user_updated_time"), Some(NOW));
    }

    #[test]
    fn test_merge_title_precedence() {
        let (front, body) = parse_markdown("---\ntitle: Front title\n---\nbody");
        let note = merge_for_push(&front, &body, remote_note(), "n1", Some("Cli title"), NOW);
        assert_eq!(note.title, "Front title");

        let (front, body) = parse_markdown("---\nnote_id: n1\n---\nbody");
        let note = merge_for_push(&front, &body, remote_note(), "n1", Some("Cli title"), NOW);
        assert_eq!(note.title, "Cli title");
    }

    #[test]
    fn test_merge_front_matter_parent_wins() {
        let (front, body) = parse_markdown("---\nparent_id: nb-local\n---\nbody");
        let note = merge_for_push(&front, &body, remote_note(), "n1", None, NOW);
        assert_eq!(note.metadata.get("parent_id"), Some("nb-local"));
    }

    #[test]
    fn test_new_note_serializes_with_defaults() {
        let note = new_note("n2", "nb", "Shopping list", "milk\neggs".to_string(), NOW);
        let text = note.serialize();

        assert!(text.starts_with("Shopping list\n\nmilk\neggs\n\n"));
        assert!(text.contains("\nparent_id: nb\n"));
        assert!(text.contains("\ncreated_time: 2024-06-01T12:00:00.000Z\n"));
        assert!(text.ends_with("\ntype_: 1"));
    }
}
