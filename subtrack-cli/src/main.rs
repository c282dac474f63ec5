use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use subtrack_vault::VaultError;
use tracing_subscriber::EnvFilter;

mod check;
mod config;
mod seal;

use config::{load_settings, process_env, ConfigError};

#[derive(Parser, Debug)]
#[command(
    name = "subtrack",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SUBTRACK_BUILD_SHA"), ")"),
    about = "Daily renewal check for an encrypted subscription list"
)]
struct Cli {
    /// Optional TOML settings file (payload path, timezone, bark server/group)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decrypt the store and push a notification for everything due today or tomorrow (default)
    Check {
        /// Print the notifications instead of sending them
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Evaluate as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Decrypt the store and print every subscription with its next billing date
    List {
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Encrypt a plaintext JSON subscription list into the store
    Seal {
        /// Plaintext JSON array of subscriptions
        #[arg(long)]
        input: PathBuf,

        /// Destination (default: configured payload path)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show resolved configuration with secrets masked
    ConfigCheck,
}

const EXIT_FAILURE: u8 = 1;
const EXIT_CONFIG_MISSING: u8 = 2;
const EXIT_PAYLOAD_UNREADABLE: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Logs go to stderr; stdout is reserved for command output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("subtrack=info,subtrack_vault=info,subtrack_notify=info")
            }),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.config.as_deref())?;
    let env = process_env;

    match cli.command.unwrap_or(Command::Check {
        dry_run: false,
        today: None,
    }) {
        Command::Check { dry_run, today } => {
            check::run(&settings, &env, check::CheckOptions { dry_run, today }).await?;
        }
        Command::List { today } => check::list(&settings, &env, today)?,
        Command::Seal { input, output } => {
            seal::run(&settings, &env, &input, output)?;
        }
        Command::ConfigCheck => config::config_check(&settings, &env)?,
    }

    Ok(())
}

/// Map the first typed error in the chain to a process exit code.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            return match e {
                ConfigError::Missing(_) => EXIT_CONFIG_MISSING,
                _ => EXIT_FAILURE,
            };
        }
        if let Some(e) = cause.downcast_ref::<VaultError>() {
            return match e {
                VaultError::MissingConfiguration(_) => EXIT_CONFIG_MISSING,
                VaultError::DecryptionFailed(_) | VaultError::MalformedPayload(_) => {
                    EXIT_PAYLOAD_UNREADABLE
                }
                VaultError::PayloadAbsent(_) | VaultError::Io { .. } => EXIT_FAILURE,
            };
        }
    }
    EXIT_FAILURE
}
