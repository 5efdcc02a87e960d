//! procfs-collector
//!
//! Per-process and per-state metrics collected from procfs, served over HTTP
//! or queried once from the command line.
//! This is the main entry point that initializes the server and handles subcommands.

mod cli;
mod commands;
mod config;
mod handlers;
mod state;

use anyhow::Context;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, Level};

use cli::{Args, Commands};
use commands::{command_check, command_config, command_metrics, command_query};
use config::{
    resolve_config, show_config, validate_effective_config, Config, DEFAULT_BIND_ADDR,
    DEFAULT_LOG_LEVEL, DEFAULT_PORT,
};
use state::AppState;

/// Initializes tracing logging subsystem with configured log level.
/// No subscriber is installed when the level is `off`.
fn setup_logging(config: &Config) -> anyhow::Result<()> {
    let level = config.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
    let log_level = match level {
        "off" => return Ok(()),
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> anyhow::Result<Config> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Resolves when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        show_config(&config, args.config_format.clone())?;
        return Ok(());
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        match command {
            Commands::Config {
                output,
                format,
                commented,
            } => return command_config(output.clone(), format.clone(), *commented),
            Commands::Metrics { verbose } => return command_metrics(*verbose),
            Commands::Check => {
                // Validation failures are reported by the check itself
                let config = resolve_config(&args)?;
                setup_logging(&config)?;
                if !command_check(&config)? {
                    std::process::exit(1);
                }
                return Ok(());
            }
            Commands::Query { .. } => {
                // Needs validated config
            }
        }
    }

    let config = load_validated_config(&args)?;
    setup_logging(&config)?;

    if let Some(Commands::Query { patterns, format }) = &args.command {
        // Cycles touch procfs synchronously
        let format = format.clone();
        let patterns = patterns.clone();
        let query_config = config.clone();
        return tokio::task::spawn_blocking(move || {
            command_query(&patterns, format, &query_config)
        })
        .await
        .context("query task failed")?;
    }

    info!("Starting procfs-collector");

    let bind_ip_str = config.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR).to_string();
    let port = config.port.unwrap_or(DEFAULT_PORT);

    let state = Arc::new(AppState::new(config).context("Failed to register metrics")?);
    info!(
        "Collecting from {} (system processes: {}, counter scale: {:?})",
        state.collector.options().proc_path.display(),
        state.collector.options().include_system_processes,
        state.collector.options().scale
    );

    // Configure HTTP server routes
    let bind_ip: IpAddr = bind_ip_str
        .parse()
        .with_context(|| format!("Invalid bind address {}", bind_ip_str))?;
    let addr = SocketAddr::new(bind_ip, port);
    let app = handlers::router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("procfs-collector listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("Server error: {}", e);
            e
        })?;

    info!("procfs-collector stopped gracefully");
    Ok(())
}
