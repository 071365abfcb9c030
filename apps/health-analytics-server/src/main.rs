use anyhow::Result;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use std::path::{Path, PathBuf};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Health Analytics Server - health record ingestion and summaries
#[derive(Parser)]
#[command(name = "health-analytics-server")]
#[command(about = "Health Analytics Server - health record ingestion and summaries")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use in-memory store, bus and notification sink
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Health Analytics Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, &args),
    }
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        mock = args.mock,
        "Initializing health_analytics"
    );
    health_analytics::module::run(config, args.mock).await
}

fn check_config(config: AppConfig, args: &CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    let module_cfg = health_analytics::config::HealthAnalyticsConfig::from_value(
        config.module_config(health_analytics::module::MODULE_NAME),
    )?;
    module_cfg.summary.zone()?;

    if config.store.is_none() && !args.mock {
        anyhow::bail!("invalid configuration: no `store` section (add one or pass --mock)");
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
