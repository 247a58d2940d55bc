//! Command-line interface.
//!
//! Argument parsing and result formatting for the `planlens` binary.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
