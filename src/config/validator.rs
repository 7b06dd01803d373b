//! Validation of resolved migration configurations.

use crate::error::{ConfigError, MigrateError, Result};
use tracing::debug;

use super::settings::MigrationConfig;

/// Validator for migration configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all problems found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a migration configuration.
    ///
    /// # Errors
    ///
    /// Returns the first error found, if any.
    pub fn validate(&self, config: &MigrationConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        if config.source_prefix.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("source"),
                message: String::from("Source namespace prefix (-s) is required"),
            });
        }

        if config.concurrency == 0 {
            result.errors.push(ValidationError {
                field: String::from("concurrency"),
                message: String::from("Concurrency (-n) must be at least 1"),
            });
        }

        if config.terraform_bin.as_os_str().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("terraform_bin"),
                message: String::from("Terraform executable path cannot be empty"),
            });
        }

        if !config.source_prefix.is_empty() && config.source_prefix == config.target_prefix {
            result.warnings.push(format!(
                "Source and target namespaces are both '{}', nothing will move",
                config.source_prefix
            ));
        }

        if config.concurrency > 1 && !config.lock {
            result.warnings.push(format!(
                "Running {} operations at once with state locking disabled",
                config.concurrency
            ));
        }

        if let Some(first) = result.errors.first() {
            return Err(MigrateError::Config(ConfigError::validation(
                first.message.clone(),
                first.field.clone(),
            )));
        }

        debug!("Configuration validation passed");
        Ok(result)
    }
}
