use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_BASE_URL, ENV_BASE_URL, ENV_CA_CERT, ENV_EMAIL, ENV_PASSWORD};

fn single_line(value: &str) -> Result<String, String> {
    if value.contains(['\n', '\r']) {
        return Err("title must be a single line".to_string());
    }
    Ok(value.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "joplin-sync")]
#[command(version, about = "Pull/push/create Joplin notes by note/notebook ID")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub globals: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Base URL of the note server
    #[arg(long, env = ENV_BASE_URL, default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Account email
    #[arg(long, env = ENV_EMAIL, global = true)]
    pub email: Option<String>,

    /// Account password
    #[arg(long, env = ENV_PASSWORD, hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Path to root CA cert PEM/CRT
    #[arg(long, env = ENV_CA_CERT, global = true)]
    pub ca_cert: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pull a note by note ID into a markdown file
    Pull {
        /// ID of the note to pull
        #[arg(long)]
        note_id: String,

        /// Markdown file to write
        #[arg(long)]
        out: PathBuf,
    },

    /// Push edited markdown back to an existing note
    Push {
        /// Markdown file to push
        #[arg(long)]
        file: PathBuf,

        /// Optional override if front matter has no note_id
        #[arg(long)]
        note_id: Option<String>,

        /// Optional override for note title
        #[arg(long, value_parser = single_line)]
        title: Option<String>,
    },

    /// Create a new note in a notebook ID
    Create {
        /// Notebook (folder) the note belongs to
        #[arg(long)]
        notebook_id: String,

        /// Note title
        #[arg(long, value_parser = single_line)]
        title: String,

        /// Note body
        #[arg(long, default_value = "", conflicts_with = "body_file")]
        body: String,

        /// Read body from markdown file (front matter ignored)
        #[arg(long)]
        body_file: Option<PathBuf>,

        /// Optional custom note ID (32 hex); default auto-generated
        #[arg(long)]
        note_id: Option<String>,

        /// Optionally write created note to local markdown file
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "joplin-sync",
            "pull",
            "--note-id",
            "abc",
            "--out",
            "note.md",
            "--base-url",
            "http://localhost:22300",
            "--email",
            "me@example.com",
            "--password",
            "secret",
        ])
        .unwrap();

        assert_eq!(cli.globals.base_url, "http://localhost:22300");
        assert_eq!(cli.globals.email.as_deref(), Some("me@example.com"));
        match cli.command {
            Commands::Pull { note_id, out } => {
                assert_eq!(note_id, "abc");
                assert_eq!(out, PathBuf::from("note.md"));
            }
            other => panic!("Expected pull, got {:?}", other),
        }
    }

    #[test]
    fn test_create_body_and_body_file_conflict() {
        let result = Cli::try_parse_from([
            "joplin-sync",
            "create",
            "--notebook-id",
            "nb",
            "--title",
            "T",
            "--body",
            "x",
            "--body-file",
            "b.md",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_multi_line_title_rejected() {
        let result = Cli::try_parse_from([
            "joplin-sync",
            "create",
            "--notebook-id",
            "nb",
            "--title",
            "first\nsecond",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "joplin-sync",
            "push",
            "--file",
            "n.md",
            "--title",
            "first\nsecond",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_push_requires_file() {
        let result = Cli::try_parse_from(["joplin-sync", "push", "--note-id", "abc"]);
        assert!(result.is_err());
    }
}
