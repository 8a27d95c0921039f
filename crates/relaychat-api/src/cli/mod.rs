//! CLI command definitions for the `relaychat` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod check_config;
pub mod send;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Relay chat messages to a remote agent webhook.
#[derive(Parser)]
#[command(name = "relaychat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a relaychat.toml config file.
    #[arg(long, global = true, env = "RELAYCHAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Tracing filter directives for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,relaychat_api=debug,relaychat_core=debug,relaychat_infra=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat with the agent.
    Chat {
        /// Title shown in the welcome banner.
        #[arg(long, default_value = "Relaychat")]
        title: String,

        /// Instructions shown under the title.
        #[arg(long)]
        instructions: Option<String>,
    },

    /// Send one message in a fresh session and print the reply.
    Send {
        /// Message text.
        text: String,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Validate configuration and print the effective settings.
    #[command(name = "check-config")]
    CheckConfig,

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
    fn test_parse_chat_with_banner_options() {
        let cli = Cli::parse_from([
            "relaychat",
            "chat",
            "--title",
            "Listing Writer",
            "--instructions",
            "Describe the property",
        ]);
        match cli.command {
            Commands::Chat { title, instructions } => {
                assert_eq!(title, "Listing Writer");
                assert_eq!(instructions.as_deref(), Some("Describe the property"));
            }
            _ => panic!("expected chat"),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::parse_from(["relaychat", "serve"]);
        match cli.command {
            Commands::Serve { port, host } => {
                assert_eq!(port, 3000);
                assert_eq!(host, "127.0.0.1");
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["relaychat", "send", "hello", "--json", "-vv"]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_filter(), "trace");
    }

    #[test]
    fn test_log_filter_levels() {
        let quiet = Cli::parse_from(["relaychat", "--quiet", "check-config"]);
        assert_eq!(quiet.log_filter(), "error");

        let default = Cli::parse_from(["relaychat", "check-config"]);
        assert_eq!(default.log_filter(), "warn");
    }

    #[test]
    fn test_config_path_can_come_from_dotenv_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let wanted = tmp.path().join("from-dotenv.toml");
        let env_file = tmp.path().join(".env");
        std::fs::write(&env_file, format!("RELAYCHAT_CONFIG={}\n", wanted.display())).unwrap();

        dotenvy::from_path(&env_file).unwrap();
        let cli = Cli::try_parse_from(["relaychat", "check-config"]).unwrap();

        assert_eq!(cli.config.as_deref(), Some(wanted.as_path()));
    }
}
