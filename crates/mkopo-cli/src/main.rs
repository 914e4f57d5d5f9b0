mod output;
mod screens;
mod wizard;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use mkopo_core::{fees, normalize_msisdn, ConfigManager, LoggingConfig};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use output::{print_output, OutputFormat};
use wizard::ApplyArgs;

#[derive(Parser)]
#[command(name = "mkopo")]
#[command(about = "Mkopo - check loan eligibility and pay the transaction fee via M-Pesa", long_about = None)]
#[command(version, propagate_version = true)]
struct Cli {
    /// Output format (json, pretty, table)
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply for a loan (interactive)
    Apply(ApplyArgs),

    /// List loan amounts and their transaction fees
    Options,

    /// Normalize a phone number to the M-Pesa format
    Phone {
        /// Phone number as typed, e.g. "0712 345 678"
        raw: String,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

impl Commands {
    /// Whether the command needs a valid configuration; the others still run
    /// when the config is broken.
    fn needs_config(&self) -> bool {
        matches!(self, Commands::Apply(_) | Commands::Config(ConfigCommands::Show))
    }
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a default config file
    Init {
        /// Target file (defaults to ~/.mkopo/config.toml)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match ConfigManager::load() {
        Ok(manager) => Some(manager),
        Err(_) if !cli.command.needs_config() => None,
        Err(e) => return Err(e).context("Failed to load configuration"),
    };

    let logging = manager
        .as_ref()
        .map(|m| m.config().logging.clone())
        .unwrap_or_default();
    init_tracing(&logging, cli.verbose);

    match execute_command(&cli, manager).await {
        Ok(Some(output)) => {
            print_output(cli.output, &output)?;
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so the screens on stdout stay readable.
fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        "compact" => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init(),
    }
}

async fn execute_command(
    cli: &Cli,
    manager: Option<ConfigManager>,
) -> Result<Option<serde_json::Value>> {
    match &cli.command {
        Commands::Apply(args) => {
            let manager = manager.context("Configuration not loaded")?;
            wizard::run(args.clone(), manager.config()).await?;
            Ok(None)
        }
        Commands::Options => Ok(Some(serde_json::to_value(fees::loan_options())?)),
        Commands::Phone { raw } => {
            let msisdn = normalize_msisdn(raw)?;
            Ok(Some(serde_json::json!({
                "input": raw,
                "msisdn": msisdn,
            })))
        }
        Commands::Config(cmd) => execute_config_command(cmd, manager),
    }
}

fn execute_config_command(
    cmd: &ConfigCommands,
    manager: Option<ConfigManager>,
) -> Result<Option<serde_json::Value>> {
    match cmd {
        ConfigCommands::Init { path, force } => {
            let path = match path {
                Some(path) => path.clone(),
                None => ConfigManager::user_config_path()
                    .context("Could not determine home directory")?,
            };
            if path.exists() && !force {
                bail!(
                    "Config file already exists at {}. Use --force to overwrite",
                    path.display()
                );
            }

            ConfigManager::create_default_config(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            Ok(Some(serde_json::json!({
                "config_file": path.display().to_string(),
                "status": "created",
            })))
        }
        ConfigCommands::Show => {
            let manager = manager.context("Configuration not loaded")?;
            let config = manager.config();

            let mut value = serde_json::to_value(config)?;
            if let Some(gateway) = value.get_mut("gateway").and_then(|g| g.as_object_mut()) {
                gateway.insert(
                    "api_key_set".to_string(),
                    serde_json::Value::Bool(config.gateway.api_key.is_some()),
                );
            }
            if let Some(map) = value.as_object_mut() {
                map.insert(
                    "config_file".to_string(),
                    manager
                        .config_path()
                        .map(|p| serde_json::Value::String(p.display().to_string()))
                        .unwrap_or(serde_json::Value::Null),
                );
            }

            Ok(Some(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_flags_parse() {
        let cli = Cli::try_parse_from([
            "mkopo",
            "apply",
            "--name",
            "Jane Wanjiru",
            "--phone",
            "0712345678",
            "--id-number",
            "12345678",
            "--loan-type",
            "salary-advance",
            "--amount",
            "7500",
            "--yes",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Apply(args) => {
                assert_eq!(args.name.as_deref(), Some("Jane Wanjiru"));
                assert_eq!(args.amount, Some(7_500));
                assert!(args.yes);
                assert!(args.dry_run);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_output_flag_is_global() {
        let cli = Cli::try_parse_from(["mkopo", "options", "--output", "table"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Table);
        assert!(matches!(cli.command, Commands::Options));
    }

    #[test]
    fn test_helper_commands_run_without_config() {
        let needs = |args: &[&str]| {
            Cli::try_parse_from(args.iter().copied())
                .unwrap()
                .command
                .needs_config()
        };

        assert!(!needs(&["mkopo", "phone", "0712345678"]));
        assert!(!needs(&["mkopo", "options"]));
        assert!(!needs(&["mkopo", "config", "init"]));
        assert!(needs(&["mkopo", "config", "show"]));
        assert!(needs(&["mkopo", "apply"]));
    }

    #[tokio::test]
    async fn test_phone_command_normalizes() {
        let cli = Cli::try_parse_from(["mkopo", "phone", "+254 712-345-678"]).unwrap();
        let value = execute_command(&cli, None).await.unwrap().unwrap();
        assert_eq!(value["msisdn"], "254712345678");

        let cli = Cli::try_parse_from(["mkopo", "phone", "12345"]).unwrap();
        assert!(execute_command(&cli, None).await.is_err());
    }

    #[tokio::test]
    async fn test_options_command_lists_table() {
        let cli = Cli::try_parse_from(["mkopo", "options"]).unwrap();
        let value = execute_command(&cli, None).await.unwrap().unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), fees::loan_options().len());
        assert_eq!(rows[0]["amount"], 1_500);
        assert_eq!(rows[0]["fee"], 100);
    }
}
