//! StoreSleuth: cross-platform storage inventory.
//!
//! Thin binary entry point. All logic lives in the `storesleuth-core` crate.

mod output;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use storesleuth_core::{channel, dispatch, Config, DispatchError, StorageInventory};

#[derive(Debug, Parser)]
#[command(name = "storesleuth", version, about)]
struct Cli {
    /// Config file (default: ~/.config/storesleuth/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the platform family and OS release.
    Platform,
    /// Report whether broad storage access is granted.
    Access,
    /// List external storage roots with their free space.
    Roots {
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Platform, access and roots with capacity, as JSON.
    Report,
    /// Run a single host method call and print its JSON result.
    Call { method: String },
    /// Answer JSON-lines method calls from stdin on stdout.
    Serve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Table,
    Json,
    Csv,
}

/// Exit code for a method name the dispatcher does not know.
const EXIT_NOT_IMPLEMENTED: u8 = 2;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialise structured logging. Stdout carries command output only.
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load_or_default(cli.config.as_deref()).context("loading config")?;
    let inventory = StorageInventory::native(&config);
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Command::Platform => output::platform(&mut stdout, &inventory.get_platform_info())?,
        Command::Access => {
            output::access(&mut stdout, inventory.is_full_storage_access_granted())?
        }
        Command::Roots { format } => {
            let usage = inventory
                .root_usage()
                .context("enumerating storage roots")?;
            output::roots(&mut stdout, &usage, format)?;
        }
        Command::Report => {
            let snapshot = inventory.snapshot().context("taking storage snapshot")?;
            output::json(&mut stdout, &snapshot)?;
        }
        Command::Call { method } => match dispatch(&inventory, &method) {
            Ok(response) => output::json(&mut stdout, &response)?,
            Err(e @ DispatchError::NotImplemented { .. }) => {
                tracing::error!("{e}");
                return Ok(ExitCode::from(EXIT_NOT_IMPLEMENTED));
            }
            Err(e) => return Err(e).context(format!("calling {method}")),
        },
        Command::Serve => {
            let stdin = std::io::stdin().lock();
            channel::serve(&inventory, stdin, &mut stdout).context("serving message channel")?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
