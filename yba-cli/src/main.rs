//! YBA CLI
//!
//! Command-line interface for provisioning YugabyteDB Anywhere universes and
//! previewing alert channel templates

mod commands;
mod config;
mod logging;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::alert::AlertCommands;
use commands::config::ConfigCommands;
use commands::universe::UniverseCommands;
use std::path::PathBuf;
use yba_console::YbaClient;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Platform address (defaults to the configured server)
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Output format (table, json, yaml)
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Customer uuid (defaults to the configured customer)
    #[arg(long, global = true)]
    customer: Option<String>,

    /// Also write JSON logs to this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log file rotation
    #[arg(long, global = true, value_enum, default_value_t = logging::LogRotation::Daily)]
    log_rotation: logging::LogRotation,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create universes and manage read replicas
    Universe {
        #[command(subcommand)]
        command: UniverseCommands,
    },
    /// Alert configurations and template previews
    Alert {
        #[command(subcommand)]
        command: AlertCommands,
    },
    /// Manage local CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let logging = logging::LoggingConfig {
        log_dir: cli.log_dir.clone(),
        rotation: cli.log_rotation,
        ..Default::default()
    };
    let _log_guard = match logging.init() {
        Ok(guard) => guard,
        Err(e) => {
            output::print_warning(&format!("Logging disabled: {}", e));
            None
        }
    };

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match config::Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("ignoring unreadable configuration: {}", e);
            config::Config::default()
        }
    };

    let server = cli
        .server
        .clone()
        .unwrap_or_else(|| config.default_server.clone());
    let output_format = cli
        .output
        .clone()
        .unwrap_or_else(|| config.default_output.clone());

    match cli.command {
        Commands::Universe { command } => {
            let api = connect(&config, &server, cli.customer.as_deref())?;
            commands::universe::handle_universe_command(command, &api, &config, &output_format)
                .await?
        }
        Commands::Alert { command } => {
            let api = connect(&config, &server, cli.customer.as_deref())?;
            commands::alert::handle_alert_command(command, &api, &output_format).await?
        }
        Commands::Config { command } => {
            commands::config::handle_config_command(command, &mut config, &output_format)?
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Build a platform client from flags and stored configuration
fn connect(config: &config::Config, server: &str, customer: Option<&str>) -> Result<YbaClient> {
    let customer = customer
        .or(config.customer_uuid.as_deref())
        .context("no customer configured, pass --customer or run `yba config set-customer`")?;

    let client = YbaClient::new(server, customer)?;
    match config.resolve_token() {
        Some(token) => Ok(client.with_token(&token)),
        None => {
            tracing::warn!("no API token configured, requests will be unauthenticated");
            Ok(client)
        }
    }
}

/// Generate shell completions
fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());
}
