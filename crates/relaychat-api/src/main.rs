//! Relaychat CLI and REST API entry point.
//!
//! Binary name: `relaychat`
//!
//! Parses CLI arguments, loads and validates the relay configuration, then
//! dispatches to the terminal chat, a one-shot send, or the REST API server.
//! A configuration error stops the process before any input is accepted.

mod cli;
mod http;
mod state;

use std::path::Path;

use clap::Parser;
use clap_complete::generate;

use relaychat_infra::config::{load_dotenv, load_relay_config};
use relaychat_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before parsing, so `.env` can supply env-backed flags like RELAYCHAT_CONFIG.
    load_dotenv();
    let cli = Cli::parse();

    init_tracing(cli.log_filter(), cli.log_json, cli.otel)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        // Shell completions don't need configuration
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "relaychat", &mut std::io::stdout());
        }

        Commands::CheckConfig => {
            let config = load_relay_config(cli.config.as_deref()).await?;
            cli::check_config::check_config(&config, cli.json)?;
        }

        Commands::Chat {
            title,
            instructions,
        } => {
            let state = app_state(cli.config.as_deref()).await?;
            cli::chat::loop_runner::run_chat_loop(&state, &title, instructions.as_deref()).await?;
        }

        Commands::Send { text } => {
            let state = app_state(cli.config.as_deref()).await?;
            cli::send::send_message(&state, text, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            let state = app_state(cli.config.as_deref()).await?;
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Relaychat API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }
            tracing::info!(%addr, "HTTP server started");

            let sweep = state.spawn_idle_sweep();
            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if let Some(sweep) = sweep {
                sweep.abort();
            }
            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }
    }

    Ok(())
}

/// Load and validate the config, then wire the shared state.
///
/// A configuration error stops the command before any input is accepted.
async fn app_state(config_path: Option<&Path>) -> anyhow::Result<AppState> {
    let config = load_relay_config(config_path).await?;
    AppState::from_config(&config)
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
