pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod note;

pub use client::{ApiClient, ClientConfig, Session};
pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use note::{Note, NoteMetadata};
