use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use joplin_sync::cli::{handle_create, handle_pull, handle_push, Cli, Commands, CreateRequest};
use joplin_sync::config::{SyncConfig, ENV_LOG};
use joplin_sync::SyncError;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let config = match SyncConfig::from_globals(
        &cli.globals.base_url,
        cli.globals.email,
        cli.globals.password,
        cli.globals.ca_cert,
    ) {
        Ok(config) => config,
        Err(e @ SyncError::MissingCredentials) => {
            Cli::command()
                .error(ErrorKind::MissingRequiredArgument, e.to_string())
                .exit();
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Pull { note_id, out } => handle_pull(&config, note_id, out),
        Commands::Push {
            file,
            note_id,
            title,
        } => handle_push(&config, file, note_id, title),
        Commands::Create {
            notebook_id,
            title,
            body,
            body_file,
            note_id,
            out,
        } => handle_create(
            &config,
            CreateRequest {
                notebook_id,
                title,
                body,
                body_file,
                note_id,
                out,
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}
