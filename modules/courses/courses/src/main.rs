use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use courses::config::{CONFIG_PATH_ENV, CoursesConfig};
use courses::{CourseStore, GrpcServer, Handshake, logging, seeded_store, signals};

/// Courses Server - in-memory courses plugin served over gRPC
#[derive(Parser)]
#[command(name = "courses-server")]
#[command(about = "Courses Server - in-memory courses plugin served over gRPC")]
#[command(version)]
struct Cli {
    /// Path to configuration file (falls back to $COURSES_CONFIG)
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Listen address override: `host:port` or `uds:///path/to/socket`
    #[arg(short, long)]
    listen: Option<String>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) defaults -> 2) YAML (if provided) -> 3) env (COURSES__*) -> 4) CLI overrides
    let mut config = CoursesConfig::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }

    if cli.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    logging::init_logging(&config.logging, cli.verbose)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(&config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &CoursesConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.validate()?;
    println!("Configuration is valid");
    Ok(())
}

async fn run_server(config: &CoursesConfig) -> Result<()> {
    let listen = config.listen()?;
    tracing::info!(listen_addr = %config.listen_addr, seed = config.seed, "Courses Server starting");

    let store = Arc::new(if config.seed {
        seeded_store()
    } else {
        CourseStore::new()
    });

    let bound = GrpcServer::new(store, listen)
        .with_health(config.health.enabled)
        .bind()
        .await?;

    if config.plugin.handshake {
        let handshake = Handshake {
            core_protocol_version: config.plugin.core_protocol_version,
            app_protocol_version: config.plugin.app_protocol_version,
        };
        println!("{}", bound.endpoint().handshake_line(handshake));
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = signals::wait_for_shutdown().await {
            tracing::error!(error = %e, "signal handling failed, shutting down");
        }
        on_signal.cancel();
    });

    bound.serve(cancel).await?;
    tracing::info!("Courses Server stopped");
    Ok(())
}
