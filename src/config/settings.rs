//! Configuration types for a migration run.
//!
//! [`Settings`] maps to the optional YAML settings file, [`MigrationRequest`]
//! carries what the operator asked for on the command line, and
//! [`MigrationConfig`] is the resolved result handed to the planner and
//! executor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::planner::DEFAULT_CONCURRENCY;
use crate::state::{NamespacePrefix, DEFAULT_TERRAFORM_BIN};

/// Persistent defaults loaded from a settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Terraform executable.
    #[serde(default)]
    pub terraform_bin: Option<PathBuf>,
    /// Directory Terraform runs in.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Whether Terraform locks state for each operation.
    #[serde(default)]
    pub lock: Option<bool>,
    /// Maximum number of operations in flight.
    #[serde(default)]
    pub concurrency: Option<usize>,
}

/// Options given for a single run. Unset options fall back to [`Settings`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationRequest {
    /// Source namespace prefix.
    pub source_prefix: String,
    /// Target namespace prefix.
    pub target_prefix: String,
    /// Whether occupied targets may be overwritten.
    pub force: bool,
    /// Whether to skip the confirmation prompt.
    pub auto_approve: bool,
    /// Whether to stop after printing the plan.
    pub dry_run: bool,
    /// Lock override.
    pub lock: Option<bool>,
    /// Concurrency override.
    pub concurrency: Option<usize>,
    /// Terraform executable override.
    pub terraform_bin: Option<PathBuf>,
    /// Working directory override.
    pub working_dir: Option<PathBuf>,
}

/// Fully resolved configuration for a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Namespace the resources are moved out of.
    pub source_prefix: NamespacePrefix,
    /// Namespace the resources are moved into.
    pub target_prefix: NamespacePrefix,
    /// Whether Terraform locks state for each operation.
    pub lock: bool,
    /// Whether occupied targets may be overwritten.
    pub force: bool,
    /// Whether to skip the confirmation prompt.
    pub auto_approve: bool,
    /// Whether to stop after printing the plan.
    pub dry_run: bool,
    /// Maximum number of operations in flight.
    pub concurrency: usize,
    /// Terraform executable.
    pub terraform_bin: PathBuf,
    /// Directory Terraform runs in.
    pub working_dir: Option<PathBuf>,
}

impl MigrationConfig {
    /// Resolves a configuration, preferring the request over the settings.
    #[must_use]
    pub fn resolve(request: MigrationRequest, settings: Settings) -> Self {
        Self {
            source_prefix: NamespacePrefix::new(&request.source_prefix),
            target_prefix: NamespacePrefix::new(&request.target_prefix),
            lock: request.lock.or(settings.lock).unwrap_or(true),
            force: request.force,
            auto_approve: request.auto_approve,
            dry_run: request.dry_run,
            concurrency: request
                .concurrency
                .or(settings.concurrency)
                .unwrap_or(DEFAULT_CONCURRENCY),
            terraform_bin: request
                .terraform_bin
                .or(settings.terraform_bin)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TERRAFORM_BIN)),
            working_dir: request.working_dir.or(settings.working_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(source: &str, target: &str) -> MigrationRequest {
        MigrationRequest {
            source_prefix: source.to_string(),
            target_prefix: target.to_string(),
            ..MigrationRequest::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = MigrationConfig::resolve(request("module.app.", ""), Settings::default());

        assert_eq!(config.source_prefix.as_str(), "module.app");
        assert!(config.target_prefix.is_empty());
        assert!(config.lock);
        assert!(!config.force);
        assert!(!config.auto_approve);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.terraform_bin, PathBuf::from("terraform"));
        assert_eq!(config.working_dir, None);
    }

    #[test]
    fn test_request_overrides_settings() {
        let settings = Settings {
            terraform_bin: Some(PathBuf::from("/opt/tf/terraform")),
            working_dir: Some(PathBuf::from("/srv/infra")),
            lock: Some(false),
            concurrency: Some(4),
        };
        let mut req = request("a", "b");
        req.lock = Some(true);
        req.concurrency = Some(8);

        let config = MigrationConfig::resolve(req, settings);

        assert!(config.lock);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.terraform_bin, PathBuf::from("/opt/tf/terraform"));
        assert_eq!(config.working_dir, Some(PathBuf::from("/srv/infra")));
    }
}
