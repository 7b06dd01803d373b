// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![forbid(unsafe_code)]               // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # tfstate-mv
//!
//! Bulk relocation of Terraform state addresses from one namespace to another.
//!
//! ## Overview
//!
//! Moving a module in Terraform code means running `terraform state mv` once
//! for every resource it tracks. This crate does it for a whole namespace:
//!
//! 1. **List**: snapshot every address in state
//! 2. **Plan**: map each address under the source prefix onto the target
//!    prefix, refusing to overwrite existing addresses unless forced
//! 3. **Confirm**: show the plan and wait for the operator's `yes`
//! 4. **Execute**: run the moves in parallel, at most `N` at a time
//!
//! ## Modules
//!
//! - [`config`]: Settings file, environment overrides and validation
//! - [`state`]: Resource addresses and the Terraform CLI backend
//! - [`planner`]: Plan construction, confirmation and bounded execution
//! - [`runner`]: One migration from listing to report
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```text
//! tfstate-mv -s module.app -t module.platform.module.app -n 4
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod planner;
pub mod runner;
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, OutputFormatter};
pub use config::{ConfigLoader, ConfigValidator, MigrationConfig, MigrationRequest, Settings};
pub use error::{MigrateError, Result};
pub use planner::{
    confirm, Decision, ExecutionReport, MigrationExecutor, MigrationPlan, MoveMapping,
    MoveOutcome, PlanBuilder,
};
pub use runner::{MigrationRunner, RunEvent, RunStatus};
pub use state::{NamespacePrefix, ResourceAddress, StateBackend, TerraformCli};
