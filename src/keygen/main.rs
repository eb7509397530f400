// src/keygen/main.rs

//! Operator tool for issuing license keys.
//!
//! Keep this binary and the signing secret private. Customers send their
//! machine id (shown by `license_client machine-id`); the operator runs
//! this tool and sends back the printed key.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;

use licensegate::config::LicensingConfig;
use licensegate::errors::{LicenseError, LicenseResult};
use licensegate::fingerprint::get_machine_id;
use licensegate::keygen::{ExpirationPreset, KeyOptions, KeyRequest, Prompter};
use licensegate::logging::init_logging;
use licensegate::Licensing;

#[derive(Debug, Parser)]
#[command(name = "license_keygen", about = "Generate machine-bound license keys")]
struct Args {
    /// Customer machine id (XXXX-XXXX-XXXX-XXXX). Prompted for when omitted.
    #[arg(long, conflicts_with = "this_machine")]
    machine_id: Option<String>,

    /// Issue the key for the machine running this tool.
    #[arg(long)]
    this_machine: bool,

    /// Customer name written into the key.
    #[arg(long)]
    name: Option<String>,

    /// `lifetime`, `1m`, `6m`, `1y`, or a last day as YYYY-MM-DD.
    #[arg(long = "valid-for", alias = "expires")]
    valid_for: Option<ExpirationPreset>,

    /// Activate the key on this machine (only with --this-machine).
    #[arg(long, requires = "this_machine")]
    save: bool,

    /// Configuration file to load instead of `licensegate.toml`.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn run(args: Args) -> LicenseResult<()> {
    let config = match &args.config {
        Some(path) => LicensingConfig::load_from(path)?,
        None => LicensingConfig::load()?,
    };
    init_logging(&config.logging);
    let licensing = Licensing::from_config(&config)?;

    let options = KeyOptions {
        machine_id: if args.this_machine {
            Some(get_machine_id())
        } else {
            args.machine_id
        },
        client_name: args.name,
        expiration: args.valid_for,
    };
    let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
    let request = KeyRequest::gather(options, &config.license.default_client_name, &mut prompter)?;

    let today = Local::now().date_naive();
    let key = request.issue(licensing.signer(), today);

    println!();
    println!("Machine ID: {}", request.machine_id);
    println!("Client Name: {}", request.client_name);
    match request.expiration_date(today) {
        Some(date) => println!("Expiration: {date}"),
        None => println!("Expiration: Lifetime"),
    }
    println!();
    println!("LICENSE KEY:");
    println!("{}", "=".repeat(60));
    println!("{key}");
    println!("{}", "=".repeat(60));

    if !args.this_machine {
        println!("Copy this key and send it to the customer.");
        return Ok(());
    }

    if args.save {
        licensing.activate(&key)?;
        if let Some(path) = licensing.store().canonical_path() {
            println!("License key saved to {}", path.display());
        }
    } else {
        licensing.verify(&key)?;
    }
    println!("License key is VALID for this machine.");

    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(LicenseError::Verification(e)) => {
            eprintln!("License key verification failed: {e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error generating key: {e}");
            ExitCode::FAILURE
        }
    }
}
