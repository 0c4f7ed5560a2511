//! Parley CLI and REST API entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, initializes tracing and the chat service, then
//! dispatches to the appropriate command handler or starts the REST API
//! server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use parley_observe::tracing_setup::{init_tracing, shutdown_tracing, TracingOptions};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    // `serve` logs request handling at info by default; one-shot commands stay quiet
    let serving = matches!(cli.command, Commands::Serve { .. });
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 if serving => "info",
        0 => "warn",
        1 => "info,parley_core=debug,parley_api=debug",
        _ => "trace",
    };
    let options = TracingOptions::new(cli.log_format, filter).with_otel(cli.otel);
    init_tracing(options).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let state = AppState::init(cli.data_dir.clone()).await?;
    tracing::debug!(data_dir = %state.data_dir.display(), "Application state ready");

    let result = run(&cli, state.clone()).await;

    // Pending replies from `send --no-wait` are discarded here.
    state.chat_service.shutdown().await;
    shutdown_tracing();

    result
}

async fn run(cli: &Cli, state: AppState) -> anyhow::Result<()> {
    let json = cli.json;
    let quiet = cli.quiet;

    match &cli.command {
        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !quiet {
                println!(
                    "  {} Parley API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }
            tracing::info!(%addr, "Server started");

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            tracing::info!("Server stopped");
            if !quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::List => cli::message::list_messages(&state, json).await?,

        Commands::Show { id } => cli::message::show_message(&state, *id, json).await?,

        Commands::Send {
            text,
            sender,
            no_wait,
        } => {
            cli::message::send_message(
                &state,
                text.clone(),
                sender.clone(),
                *no_wait,
                json,
                quiet,
            )
            .await?;
        }

        Commands::Edit { id, text } => {
            cli::message::edit_message(&state, *id, text, json, quiet).await?;
        }

        Commands::Delete { id } => {
            cli::message::delete_message(&state, *id, json, quiet).await?;
        }

        Commands::Clear { force } => {
            cli::message::clear_messages(&state, *force, json, quiet).await?;
        }

        Commands::Reply { text, sender } => {
            cli::message::probe_reply(&state, text, sender.as_deref(), json)?;
        }

        Commands::Completions { .. } => unreachable!("handled in main"),
    }

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
    tracing::info!("Shutdown signal received");
}
