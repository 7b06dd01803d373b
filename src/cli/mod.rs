//! CLI module for the migration tool.
//!
//! This module provides the command-line flags and the formatting of
//! everything printed to the operator.

mod commands;
mod output;

pub use commands::{Cli, OutputFormat};
pub use output::OutputFormatter;
