//! Command-line interface
//!
//! # Submodules
//!
//! - `args` - argument and subcommand definitions using clap
//! - `commands` - command handler implementations

pub mod args;
pub mod commands;

// Re-export commonly used types for convenience
pub use args::{Args, Commands};
pub use commands::run_command;
