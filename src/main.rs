//! Skycam - CLI Entry Point
//!
//! Tethered DSLR control for unattended long-exposure astrophotography.
//!
//! This binary is a thin wrapper around the library, handling argument
//! parsing, logging setup, the Ctrl+C handler and command dispatch.

mod cli;
mod core;
mod device;

use anyhow::Result;
use clap::Parser;
use cli::Args;
use core::capture::CancelToken;
use core::config::{config_path, Config};
use env_logger::Builder;
use log::{info, LevelFilter};

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration; a missing or malformed file is recovered with
    // defaults inside the loader.
    let config = match args.config {
        Some(ref path) => Config::load(path),
        None => Config::load(config_path()),
    }
    .unwrap_or_else(|e| {
        eprintln!("Warning: failed to load config file: {}", e);
        Config::default()
    });

    // Set up graceful shutdown: first Ctrl+C cancels the session
    // cooperatively, a second one force-exits.
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        if handler_token.is_cancelled() {
            eprintln!("\nForce shutdown requested. Exiting immediately...");
            std::process::exit(1);
        }
        handler_token.cancel();
        eprintln!(
            "\nGraceful shutdown requested. Finishing current exposure... (Press Ctrl+C again to force quit)"
        );
    })
    .expect("Failed to set Ctrl+C handler");

    // An explicit --log-level wins over RUST_LOG
    match args.log_level.as_deref() {
        Some(level) => {
            let filter = match level.to_lowercase().as_str() {
                "error" => LevelFilter::Error,
                "warn" => LevelFilter::Warn,
                "debug" => LevelFilter::Debug,
                "trace" => LevelFilter::Trace,
                _ => LevelFilter::Info,
            };
            Builder::new().filter_level(filter).init();
        }
        None => {
            Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        }
    }

    info!("skycam v{}", env!("CARGO_PKG_VERSION"));

    cli::run_command(&args, &config, cancel)?;

    Ok(())
}
