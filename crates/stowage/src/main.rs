// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stowage - export CSV rows into SQLite through an asynchronous batched writer.
//!
//! This is the binary entry point.

mod export;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stowage_config::ConfigSource;

use crate::export::ExportArgs;

/// Stowage - asynchronous batched exports into SQLite.
#[derive(Parser, Debug)]
#[command(name = "stowage", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the standard lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Export a CSV file into a SQLite table.
    Export(ExportArgs),
    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let source = ConfigSource::from_override(cli.config.as_deref());
    let config = match stowage_config::load_and_validate(source) {
        Ok(config) => config,
        Err(errors) => {
            stowage_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(Commands::Export(args)) => {
            init_tracing(&config.logging.level);
            stowage_writer::metrics::register_metrics();
            match export::run_export(&args, &config) {
                Ok(report) => {
                    println!(
                        "exported {} rows in {} statements ({} commits)",
                        report.rows_read,
                        report.summary.statements_executed,
                        report.summary.commits
                    );
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("stowage: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        Some(Commands::Config) => match stowage_config::render_toml(&config) {
            Ok(rendered) => {
                print!("{rendered}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("stowage: failed to render configuration: {err}");
                ExitCode::FAILURE
            }
        },
        None => {
            println!("stowage: use --help for available commands");
            ExitCode::SUCCESS
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("stowage={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .init();
}
