mod cli;
mod errors;
mod handlers;
mod ui;

use std::process::ExitCode;
use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use crate::cli::{Cli, Commands};
use crate::errors::{CliError, EXIT_USAGE};
use crate::handlers::{handle_join, handle_split};
use crate::ui::printer::{print_join_report, print_json, print_split_report};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // usage goes to stdout for --help, stderr otherwise
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_USAGE),
            };
        }
    };

    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Split {
            parts,
            source,
            output_dir,
        } => {
            let report = handle_split(&parts, &source, &output_dir)?;
            if cli.json {
                print_json(&report)?;
            } else {
                print_split_report(&report);
            }
        }
        Commands::Join { input, output } => {
            let report = handle_join(&input, &output)?;
            if cli.json {
                print_json(&report)?;
            } else {
                print_join_report(&report);
            }
        }
    }
    Ok(())
}
