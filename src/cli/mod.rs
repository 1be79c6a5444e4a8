mod commands;
mod handlers;

pub use commands::{Cli, Commands, GlobalArgs};
pub use handlers::{
    create_note, handle_create, handle_pull, handle_push, merge_for_push, new_note, pull_note,
    push_note, CreateRequest,
};
