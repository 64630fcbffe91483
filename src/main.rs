//! Observer host binary
//!
//! Wires a configuration file to the ambient registry and performs one
//! facade call, so backends can be exercised from a shell.

use clap::{Parser, Subcommand};
use observer::config::ObserverConfig;
use observer::observability::{init_logging, parse_level, LogFormat};
use observer::{ambient, backends, Context, Dispatch, Severity};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Pluggable observability facade
#[derive(Parser)]
#[command(name = "observer")]
#[command(about = "Route logs, metrics and errors to configured backends")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Call(FacadeCall),
    /// Validate configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

/// One facade call against the configured providers
#[derive(Subcommand)]
enum FacadeCall {
    /// Log a message through the configured logger
    Log {
        message: String,
        /// Alternating label keys and values
        key_value_pairs: Vec<String>,
        #[arg(short, long, default_value = "info")]
        level: Severity,
    },
    /// Record a metric event through the configured metrics provider
    Meter {
        metric: String,
        /// Alternating label keys and values
        values: Vec<String>,
        #[arg(long)]
        request_id: Option<Uuid>,
    },
    /// Report an error through the configured error reporter
    Report { message: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging(parse_level("info"), LogFormat::Json, false);
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let level = match cli.verbose {
        0 => parse_level(&config.logging.level),
        1 => parse_level("debug"),
        _ => parse_level("trace"),
    };
    init_logging(
        level,
        LogFormat::parse(&config.logging.format),
        config.logging.spans,
    );

    let result = match cli.command {
        Commands::Call(call) => run_call(call, config).await,
        Commands::Config { show } => handle_config_command(&config, show),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_configuration(
    config_path: &Option<PathBuf>,
) -> Result<ObserverConfig, Box<dyn std::error::Error>> {
    match config_path {
        Some(path) => Ok(ObserverConfig::load_from_file(path)?),
        None => {
            let default_path = PathBuf::from("observer.toml");
            if default_path.exists() {
                Ok(ObserverConfig::load_from_file(&default_path)?)
            } else {
                Ok(ObserverConfig::from_env())
            }
        }
    }
}

fn handle_config_command(
    config: &ObserverConfig,
    show: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    info!(service = %config.service.name, "Configuration is valid");
    if show {
        println!("{}", config.to_toml()?);
    }
    Ok(())
}

async fn run_call(
    call: FacadeCall,
    config: ObserverConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = ambient::configure(backends::provider_configs(&config)?)?;
    info!(kinds = ?registry.registered_kinds(), "Providers configured");

    let dispatch = match call {
        FacadeCall::Log {
            message,
            key_value_pairs,
            level,
        } => {
            let pairs: Vec<&str> = key_value_pairs.iter().map(String::as_str).collect();
            ambient::log_with_level(level, &message, &pairs)
        }
        FacadeCall::Meter {
            metric,
            values,
            request_id,
        } => {
            let ctx = match request_id {
                Some(id) => Context::background().with_request_id(id),
                None => Context::new_request(),
            };
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            ambient::meter(&ctx, &metric, &values)
        }
        FacadeCall::Report { message } => {
            match ambient::report_error(Some(std::io::Error::other(message))) {
                Some(_) => Dispatch::Delivered,
                None => Dispatch::NotConfigured,
            }
        }
    };

    if dispatch == Dispatch::NotConfigured {
        warn!("No provider configured for this capability; call was a no-op");
    }

    if let Some(registry) = ambient::uninstall() {
        registry.close_providers().await?;
        info!(stats = ?registry.stats().snapshot(), "Providers closed");
    }
    Ok(())
}
