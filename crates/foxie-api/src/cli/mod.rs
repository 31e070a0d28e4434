//! CLI command definitions and dispatch for the `foxie` binary.
//!
//! Uses clap derive macros for argument parsing. Resource commands follow a
//! noun-verb pattern (e.g., `foxie sessions list`, `foxie notes sync`).

pub mod notes;
pub mod session;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat sessions and note attachments for the Foxie study assistant.
#[derive(Parser)]
#[command(name = "foxie", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug, -vvv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "FOXIE_LOG_JSON")]
    pub log_json: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "FOXIE_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to `server.port` in foxie.toml).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to `server.host` in foxie.toml).
        #[arg(long)]
        host: Option<String>,
    },

    /// Browse and delete chat sessions.
    Sessions {
        #[command(subcommand)]
        action: session::SessionCommand,
    },

    /// Manage note attachments.
    Notes {
        #[command(subcommand)]
        action: notes::NotesCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
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
    fn test_parse_sessions_delete_force() {
        let cli = Cli::try_parse_from([
            "foxie", "--json", "sessions", "delete", "u1", "s1", "--force",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Sessions {
                action: session::SessionCommand::Delete { user, id, force },
            } => {
                assert_eq!(user, "u1");
                assert_eq!(id, "s1");
                assert!(force);
            }
            _ => panic!("expected sessions delete"),
        }
    }

    #[test]
    fn test_parse_serve_defaults_to_config() {
        let cli = Cli::try_parse_from(["foxie", "-vv", "serve"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Serve {
                port: None,
                host: None
            }
        ));
    }
}
