//! Grid host process.
//!
//! Holds one in-process grid API and serves the `grid-remote` wire protocol
//! over stdin/stdout, one JSON request per line. Runs until the proxy asks
//! for shutdown or closes the pipe. Logs go to stderr; stdout belongs to the
//! protocol.

mod server;

use std::io;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use grid_api::{create_native_ugrid_api, GridApi};

#[derive(Parser, Debug)]
#[command(name = "ugrid-host")]
#[command(about = "Hosts the io_netcdf kernel for out-of-process grid access")]
struct Args {
    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let Some(mut api) = create_native_ugrid_api() else {
        bail!("io_netcdf kernel could not be loaded");
    };
    info!("grid host ready");

    let stdin = io::stdin();
    let stdout = io::stdout();
    server::serve(&mut api, stdin.lock(), stdout.lock())?;

    if let Err(code) = api.close() {
        warn!(%code, "closing the dataset on exit failed");
    }
    info!("grid host exiting");
    Ok(())
}
