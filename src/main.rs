//! Bunker - a path-addressed password store.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bunker::cli::output;
use bunker::cli::{execute, Cli};
use bunker::core::constants::LOG_ENV;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.global.verbose {
            EnvFilter::new("bunker=debug")
        } else {
            EnvFilter::new("bunker=warn")
        }
    });

    // Logs share stderr with prompts and status lines.
    let registry = tracing_subscriber::registry().with(filter);
    if cli.global.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    if let Err(e) = execute(cli.command, &cli.global) {
        output::error(&e.to_string());
        if let Some(hint) = e.hint() {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
