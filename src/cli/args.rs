//! Command-line argument definitions
//!
//! This module defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DSLR camera control for unattended long-exposure astrophotography
#[derive(Parser, Debug)]
#[command(name = "skycam")]
#[command(version)]
#[command(about = "Tethered DSLR control for unattended astrophotography sessions", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a capture session
    Start {
        /// Template name
        #[arg(short, long)]
        template: Option<String>,

        /// Exposure time in seconds
        #[arg(short, long)]
        exposure: Option<f64>,

        /// Aperture f-number
        #[arg(short, long)]
        aperture: Option<f64>,

        /// Delay between exposures in seconds
        #[arg(short, long)]
        delay: Option<f64>,

        /// ISO setting (auto or numeric label)
        #[arg(long)]
        iso: Option<String>,

        /// Image quality (e.g. raw)
        #[arg(short, long)]
        quality: Option<String>,

        /// Maximum number of exposures (0 = unlimited)
        #[arg(short, long)]
        max_exposures: Option<u32>,

        /// Camera port (auto-detect if not specified)
        #[arg(short, long)]
        port: Option<String>,

        /// Output directory for session records (overrides config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Resolve and print the layered settings without opening a camera
        #[arg(long)]
        dry_run: bool,
    },

    /// Stop an ongoing capture session
    Stop {
        /// Session ID to stop (any running session if not specified)
        session_id: Option<String>,
    },

    /// Show current session status
    Status,

    /// Template management commands
    Templates {
        #[command(subcommand)]
        command: TemplateCommands,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// List all available templates
    List,

    /// Show template details
    Show {
        /// Template name to show
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize the configuration file and template directory
    Init,

    /// Show current configuration
    Show,
}
