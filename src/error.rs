use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP {status} {url}: {body}")]
    Api {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Request failed for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Invalid note content: {0}")]
    Format(String),

    #[error("Provide --email and --password or set JOPLIN_EMAIL/JOPLIN_PASSWORD")]
    MissingCredentials,

    #[error("Title must be a single line: {0:?}")]
    MultiLineTitle(String),

    #[error("Missing note id. Add 'note_id' in front matter or pass --note-id.")]
    MissingNoteId,

    #[error("Invalid CA certificate {}: {message}", path.display())]
    Certificate { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
