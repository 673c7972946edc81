// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, set up logging, run one update.
// - A failed step exits with status 1 after its spinner has shown the failure.

use clap::Parser;
use sqlwhitelist::cli::{log_directives, Cli};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr and stay quiet unless asked for, so they don't mix
    // with the prompts.
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directives = log_directives(cli.verbose, rust_log.as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = cli.run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
