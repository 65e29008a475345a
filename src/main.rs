//! Headless simulator (default binary).
//!
//! Loads a level, lets the greedy bot play until game over or the move
//! limit, and prints a JSON summary. Configured through `BLOCKFIT_*`
//! environment variables; log level through `RUST_LOG`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use blockfit::config::SimConfig;
use blockfit::sim;

fn main() -> Result<()> {
    init_tracing();

    let config = SimConfig::from_env();
    let summary = sim::run(&config)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
