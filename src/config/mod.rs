//! Configuration module for the migration tool.
//!
//! This module handles all configuration-related functionality:
//! - Loading the optional `.tfstate-mv.yaml` settings file
//! - Environment and `.env` overrides
//! - Resolving and validating the configuration for a run

mod parser;
mod settings;
mod validator;

pub use parser::{
    apply_env_overrides, ConfigLoader, ENV_CONCURRENCY, ENV_LOCK, ENV_TERRAFORM_BIN,
    SETTINGS_FILE,
};
pub use settings::{MigrationConfig, MigrationRequest, Settings};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
