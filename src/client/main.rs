// src/client/main.rs

//! Customer-side license tool.
//!
//! - `machine-id` prints the fingerprint to send to the vendor
//! - `status` reports whether this installation is activated
//! - `activate <KEY>` verifies a key for this machine and stores it

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use licensegate::config::LicensingConfig;
use licensegate::errors::{LicenseError, LicenseResult};
use licensegate::logging::init_logging;
use licensegate::Licensing;

#[derive(Debug, Parser)]
#[command(name = "license_client", about = "Inspect and activate the local license")]
struct Args {
    /// Configuration file to load instead of `licensegate.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print this machine's id.
    MachineId,
    /// Show the activation status.
    Status,
    /// Verify and store a license key.
    Activate {
        /// The license key received from the vendor.
        key: String,
    },
}

fn run(args: Args) -> LicenseResult<bool> {
    let config = match &args.config {
        Some(path) => LicensingConfig::load_from(path)?,
        None => LicensingConfig::load()?,
    };
    init_logging(&config.logging);
    let licensing = Licensing::from_config(&config)?;

    match args.command {
        Command::MachineId => {
            println!("{}", licensing.machine_id());
            Ok(true)
        }
        Command::Status => {
            let status = licensing.status();
            println!("Machine ID: {}", licensing.machine_id());
            println!("{status}");
            Ok(status.is_activated())
        }
        Command::Activate { key } => {
            let payload = licensing.activate(&key)?;
            println!("Activated for {}.", payload.client_name);
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(LicenseError::Verification(e)) => {
            eprintln!("Activation failed: {e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
