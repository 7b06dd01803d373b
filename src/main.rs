//! tfstate-mv CLI entrypoint.
//!
//! Lists the state, builds and prints the migration plan, asks for
//! confirmation and runs the moves.

use std::io::BufReader;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use tfstate_mv::cli::{Cli, OutputFormat, OutputFormatter};
use tfstate_mv::config::{ConfigLoader, ConfigValidator, MigrationConfig};
use tfstate_mv::error::Result;
use tfstate_mv::runner::{MigrationRunner, RunEvent, RunStatus, EXIT_FAILURE};
use tfstate_mv::state::TerraformCli;

use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    let formatter = OutputFormatter::new(cli.output);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    match runtime.block_on(run(cli, &formatter)) {
        Ok(status) => ExitCode::from(status.exit_status()),
        Err(e) => {
            emit(&formatter, &formatter.format_error(&e));
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Writes operator-facing output: JSON to stdout, text to stderr.
fn emit(formatter: &OutputFormatter, text: &str) {
    match formatter.format() {
        OutputFormat::Json => println!("{text}"),
        OutputFormat::Text => eprintln!("{text}"),
    }
}

/// Main async entry point.
async fn run(cli: Cli, formatter: &OutputFormatter) -> Result<RunStatus> {
    let config = load_config(&cli)?;

    let mut backend = TerraformCli::new(&config.terraform_bin).with_lock(config.lock);
    if let Some(dir) = &config.working_dir {
        backend = backend.with_working_dir(dir);
    }
    debug!("Using terraform executable {}", backend.program().display());

    let runner = MigrationRunner::new(Arc::new(backend), config);
    runner
        .run(
            BufReader::new(std::io::stdin()),
            std::io::stderr(),
            |event| {
                let text = match event {
                    RunEvent::Planned(plan) => formatter.format_plan(plan),
                    RunEvent::Cancelled => formatter.format_cancelled(),
                    RunEvent::Outcome(outcome) => formatter.format_outcome(outcome),
                    RunEvent::Finished(report) => formatter.format_report(report),
                };
                emit(formatter, &text);
            },
        )
        .await
}

/// Loads settings, applies the command line on top and validates the result.
fn load_config(cli: &Cli) -> Result<MigrationConfig> {
    let base = cli.chdir.as_deref().unwrap_or_else(|| Path::new("."));
    let settings = ConfigLoader::new()
        .with_base_path(base)
        .load(cli.config.as_deref())?;

    let config = MigrationConfig::resolve(cli.request(), settings);
    debug!("Resolved configuration: {config:?}");

    let validation = ConfigValidator::new().validate(&config)?;
    for warning in &validation.warnings {
        warn!("{warning}");
    }

    Ok(config)
}
