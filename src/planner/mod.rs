//! Planning and execution of namespace migrations.
//!
//! This module builds the rename plan from a state snapshot, gates it on
//! operator confirmation, and executes it with bounded parallelism.

mod confirm;
mod executor;
mod plan;

pub use confirm::{confirm, Decision, CONFIRM_PROMPT};
pub use executor::{ExecutionReport, MigrationExecutor, MoveOutcome, DEFAULT_CONCURRENCY};
pub use plan::{MigrationPlan, MoveMapping, PlanBuilder};
