//! Output formatting for CLI commands.
//!
//! This module renders plans, per-move outcomes and the final report either as
//! `#>`-prefixed colored lines or as JSON.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::planner::{ExecutionReport, MigrationPlan, MoveMapping, MoveOutcome};
use crate::state::ResourceAddress;

use super::commands::OutputFormat;

/// Line marker used for every operator-facing message.
const MARKER: &str = "#>";

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Failed move row for table display.
#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Forced")]
    forced: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Returns the configured output format.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Formats a migration plan for display.
    #[must_use]
    pub fn format_plan(&self, plan: &MigrationPlan) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(plan).unwrap_or_default(),
            OutputFormat::Text => Self::format_plan_text(plan),
        }
    }

    /// Formats a plan as text.
    fn format_plan_text(plan: &MigrationPlan) -> String {
        let mut output = String::new();

        for address in &plan.skipped {
            let _ = writeln!(output, "{}", Self::format_skipped(address));
        }

        if plan.is_empty() {
            let _ = write!(
                output,
                "\n{} No resources found under <{}>, nothing to move.\n",
                MARKER.yellow(),
                plan.source_prefix
            );
            return output;
        }

        let _ = write!(
            output,
            "\n\n{} Following resources will be moved:\n",
            MARKER.blue()
        );
        for mapping in &plan.mappings {
            let _ = writeln!(output, "{}", Self::format_mapping(mapping));
        }

        let _ = write!(
            output,
            "\nPlan: {} to move, {} forced\n",
            plan.len().to_string().green(),
            plan.forced_count().to_string().magenta()
        );

        output
    }

    /// Formats a skipped address.
    fn format_skipped(address: &ResourceAddress) -> String {
        format!("{} Skipping <{address}> resource", MARKER.yellow())
    }

    /// Formats one mapping; forced moves get a magenta arrow.
    fn format_mapping(mapping: &MoveMapping) -> String {
        let arrow = if mapping.requires_force {
            "=>".magenta()
        } else {
            "=>".green()
        };
        format!(
            "{}      <{}> {arrow} <{}>",
            MARKER.cyan(),
            mapping.source,
            mapping.target
        )
    }

    /// Formats the outcome of a single move.
    #[must_use]
    pub fn format_outcome(&self, outcome: &MoveOutcome) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string(&OutcomeJson::from(outcome)).unwrap_or_default()
            }
            OutputFormat::Text => match &outcome.error {
                None => format!(
                    "{} Successfully migrated <{}> resource",
                    MARKER.green(),
                    outcome.mapping.source
                ),
                Some(error) => format!("{} {error}", MARKER.red()),
            },
        }
    }

    /// Formats the final execution report.
    #[must_use]
    pub fn format_report(&self, report: &ExecutionReport) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&ReportJson::from(report)).unwrap_or_default()
            }
            OutputFormat::Text => Self::format_report_text(report),
        }
    }

    /// Formats a report as text.
    fn format_report_text(report: &ExecutionReport) -> String {
        let status = if report.all_successful() {
            MARKER.green()
        } else {
            MARKER.red()
        };
        let mut output = format!("\n{status} {report}\n");

        let rows: Vec<FailureRow> = report
            .failures()
            .map(|o| FailureRow {
                source: o.mapping.source.to_string(),
                target: o.mapping.target.to_string(),
                forced: String::from(if o.mapping.requires_force { "yes" } else { "no" }),
                error: o
                    .error
                    .as_ref()
                    .map(|e| Self::truncate(e.diagnostic(), 60))
                    .unwrap_or_default(),
            })
            .collect();

        if !rows.is_empty() {
            output.push('\n');
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        output
    }

    /// Formats the message shown when the operator declines the plan.
    #[must_use]
    pub fn format_cancelled(&self) -> String {
        match self.format {
            OutputFormat::Json => serde_json::json!({ "status": "cancelled" }).to_string(),
            OutputFormat::Text => format!("{} Cancelled, exiting..", MARKER.yellow()),
        }
    }

    /// Formats a fatal error.
    #[must_use]
    pub fn format_error(&self, error: &dyn std::error::Error) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::json!({ "status": "error", "message": error.to_string() }).to_string()
            }
            OutputFormat::Text => format!("\n{} {error}", MARKER.red()),
        }
    }

    /// Truncates a string to a maximum number of characters, on one line.
    fn truncate(s: &str, max_len: usize) -> String {
        let line = s.lines().next().unwrap_or_default();
        if line.chars().count() <= max_len && line.len() == s.len() {
            line.to_string()
        } else {
            let cut: String = line.chars().take(max_len.saturating_sub(3)).collect();
            format!("{cut}...")
        }
    }
}

// JSON serialization helpers

#[derive(serde::Serialize)]
struct OutcomeJson<'a> {
    source: &'a str,
    target: &'a str,
    forced: bool,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    elapsed_ms: u64,
}

impl<'a> From<&'a MoveOutcome> for OutcomeJson<'a> {
    fn from(outcome: &'a MoveOutcome) -> Self {
        Self {
            source: outcome.mapping.source.as_str(),
            target: outcome.mapping.target.as_str(),
            forced: outcome.mapping.requires_force,
            success: outcome.is_success(),
            error: outcome.error.as_ref().map(ToString::to_string),
            elapsed_ms: u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[derive(serde::Serialize)]
struct ReportJson<'a> {
    total: usize,
    successful: usize,
    failed: usize,
    outcomes: Vec<OutcomeJson<'a>>,
}

impl<'a> From<&'a ExecutionReport> for ReportJson<'a> {
    fn from(report: &'a ExecutionReport) -> Self {
        Self {
            total: report.total(),
            successful: report.successful(),
            failed: report.failed(),
            outcomes: report.outcomes.iter().map(OutcomeJson::from).collect(),
        }
    }
}
