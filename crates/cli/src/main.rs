//! `ctr-envelope`: binary entry point.
//!
//! Startup sequence:
//! 1. Parse command-line arguments.
//! 2. Load and validate [`Config`] from environment variables.
//! 3. Initialise structured JSON logging on stderr.
//! 4. Run the command and print its JSON result (or error) on stdout.

mod cli;
mod commands;
mod config;
mod telemetry;

use std::process::ExitCode;

use clap::Parser;
use common::protocol::ErrorResponse;
use common::CodecError;
use tracing::{error, info};

use config::Config;

fn main() -> ExitCode {
    // -----------------------------------------------------------------------
    // 1. Arguments
    // -----------------------------------------------------------------------
    let args = cli::Args::parse();

    // -----------------------------------------------------------------------
    // 2. Configuration
    // -----------------------------------------------------------------------
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            // Telemetry is not yet up; write to stderr directly.
            eprintln!("ERROR: configuration invalid: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    if let Err(e) = telemetry::init(&cfg.log_level) {
        eprintln!("ERROR: {e:#}");
        return ExitCode::FAILURE;
    }
    info!(version = env!("CARGO_PKG_VERSION"), "ctr-envelope starting");

    // -----------------------------------------------------------------------
    // 4. Command
    // -----------------------------------------------------------------------
    match commands::run(&args, &cfg) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let (status, body) = match e.downcast_ref::<CodecError>() {
                Some(ce) => (ce.exit_code(), ErrorResponse::from(ce)),
                None => (1, ErrorResponse::new("error", format!("{e:#}"))),
            };
            error!(code = %body.code, error = %body.message, "command failed");
            match serde_json::to_string(&body) {
                Ok(json) => println!("{json}"),
                Err(_) => eprintln!("ERROR: {}", body.message),
            }
            ExitCode::from(u8::try_from(status).unwrap_or(1))
        }
    }
}
