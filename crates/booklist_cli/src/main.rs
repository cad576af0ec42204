//! `booklist` command-line entry point.
//!
//! # Responsibility
//! - Parse flags into one [`booklist_core::Command`].
//! - Hand off to [`run::execute`], which starts file logging once the store
//!   is ready.

mod cli;
mod run;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let config = cli.config();

    let command = cli.command();
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    run::execute(&command, &config, &mut stdout.lock(), &mut stderr.lock()).into()
}
