//! CLI argument definitions.
//!
//! This module defines the command-line flags using clap. Boolean flags
//! accept an optional value so that both `-f` and `-l false` (or `-l=false`)
//! work.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::MigrationRequest;

/// tfstate-mv - Move whole namespaces of Terraform state in one go.
#[derive(Parser, Debug)]
#[command(name = "tfstate-mv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source resource namespace (prefix).
    #[arg(short = 's', long = "source", value_name = "PREFIX")]
    pub source: String,

    /// Target resource namespace (prefix). Empty moves resources to the root.
    #[arg(short = 't', long = "target", value_name = "PREFIX", default_value = "")]
    pub target: String,

    /// Lock the state for each operation [default: true].
    #[arg(
        short = 'l',
        long = "lock",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub lock: Option<bool>,

    /// Force move resources whose target exists: deletes, then moves.
    #[arg(
        short = 'f',
        long = "force",
        value_name = "BOOL",
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub force: bool,

    /// Auto approve the plan.
    #[arg(
        short = 'y',
        long = "yes",
        value_name = "BOOL",
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub yes: bool,

    /// Number of operations to run at once [default: 1].
    #[arg(short = 'n', long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,

    /// Path to a settings file.
    #[arg(short = 'c', long, env = "TFSTATE_MV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Terraform executable.
    #[arg(long = "terraform-bin", value_name = "PATH")]
    pub terraform_bin: Option<PathBuf>,

    /// Directory to run Terraform in.
    #[arg(short = 'C', long = "chdir", value_name = "DIR")]
    pub chdir: Option<PathBuf>,

    /// Print the plan and exit without moving anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the migration options given on the command line.
    #[must_use]
    pub fn request(&self) -> MigrationRequest {
        MigrationRequest {
            source_prefix: self.source.clone(),
            target_prefix: self.target.clone(),
            force: self.force,
            auto_approve: self.yes,
            dry_run: self.dry_run,
            lock: self.lock,
            concurrency: self.concurrency,
            terraform_bin: self.terraform_bin.clone(),
            working_dir: self.chdir.clone(),
        }
    }
}
