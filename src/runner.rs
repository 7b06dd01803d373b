//! End-to-end migration run.
//!
//! This module drives one migration from the state listing to the final
//! report: list, plan, confirm, execute. Everything the operator should see
//! is handed to the caller as [`RunEvent`]s.

use chrono::Utc;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::MigrationConfig;
use crate::error::{MigrateError, Result};
use crate::planner::{
    confirm, Decision, ExecutionReport, MigrationExecutor, MigrationPlan, MoveOutcome,
    PlanBuilder,
};
use crate::state::StateBackend;

/// Process exit status for a run that ended with an error.
pub const EXIT_FAILURE: u8 = 1;

/// How a run ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every planned move was attempted (some may have failed).
    Completed,
    /// The operator declined the plan.
    Cancelled,
}

impl RunStatus {
    /// Returns the process exit status for this outcome.
    #[must_use]
    pub const fn exit_status(self) -> u8 {
        match self {
            Self::Completed => 0,
            Self::Cancelled => EXIT_FAILURE,
        }
    }
}

/// Progress of a run, in the order it happens.
#[derive(Debug, Clone, Copy)]
pub enum RunEvent<'a> {
    /// The plan was built.
    Planned(&'a MigrationPlan),
    /// The operator declined the plan.
    Cancelled,
    /// One mapping finished.
    Outcome(&'a MoveOutcome),
    /// Every mapping finished.
    Finished(&'a ExecutionReport),
}

/// Runs a migration against a state backend.
#[derive(Debug)]
pub struct MigrationRunner<B: ?Sized> {
    /// State backend.
    backend: Arc<B>,
    /// Resolved configuration.
    config: MigrationConfig,
}

impl<B: StateBackend + ?Sized + 'static> MigrationRunner<B> {
    /// Creates a new runner.
    #[must_use]
    pub const fn new(backend: Arc<B>, config: MigrationConfig) -> Self {
        Self { backend, config }
    }

    /// Performs the migration.
    ///
    /// The confirmation prompt is written to `prompt` and answered from
    /// `input` on a blocking thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be listed, planning fails, or
    /// the confirmation prompt cannot be read. Failed mappings are reported
    /// through [`RunEvent::Outcome`] and do not fail the run.
    pub async fn run<R, W, E>(&self, input: R, prompt: W, mut on_event: E) -> Result<RunStatus>
    where
        R: BufRead + Send + 'static,
        W: Write + Send + 'static,
        E: FnMut(RunEvent<'_>),
    {
        info!(
            "Listing state resources with {} backend",
            self.backend.backend_type()
        );
        let addresses = self.backend.list_addresses().await?;

        let plan = PlanBuilder::new(
            self.config.source_prefix.clone(),
            self.config.target_prefix.clone(),
        )
        .with_force(self.config.force)
        .with_created_at(Utc::now())
        .build(&addresses)?;

        on_event(RunEvent::Planned(&plan));

        if plan.is_empty() || self.config.dry_run {
            debug!("Nothing to execute");
            return Ok(RunStatus::Completed);
        }

        let auto_approve = self.config.auto_approve;
        let decision = tokio::task::spawn_blocking(move || confirm(auto_approve, input, prompt))
            .await
            .map_err(|e| MigrateError::internal(format!("Confirmation prompt failed: {e}")))??;

        if decision == Decision::Abort {
            info!("Migration cancelled by operator");
            on_event(RunEvent::Cancelled);
            return Ok(RunStatus::Cancelled);
        }

        let executor = MigrationExecutor::new(Arc::clone(&self.backend), self.config.concurrency);
        let report = executor
            .execute(&plan, |outcome| on_event(RunEvent::Outcome(outcome)))
            .await;

        on_event(RunEvent::Finished(&report));

        Ok(RunStatus::Completed)
    }
}
