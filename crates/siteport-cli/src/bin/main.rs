//! siteport CLI binary entry point
//!
//! Sets up logging, then calls the library's `run_cli()` function.

use anyhow::Result;
use siteport_cli::run_cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    run_cli()
}
