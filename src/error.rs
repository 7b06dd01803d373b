//! Error types for the state migration tool.
//!
//! Fatal errors (configuration, listing, planning) abort the run before the
//! operator is ever asked to confirm. Per-mapping execution failures are
//! carried as [`StateError`] values inside execution outcomes and never
//! surface as a run-level error.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the migration tool.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// State backend errors.
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Planning errors.
    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file was not found.
    #[error("Settings file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The settings file or an environment value could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },
}

/// Errors raised by the external state-management primitives.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateError {
    /// The existing addresses could not be enumerated.
    #[error("Failed to list state resources: {diagnostic}")]
    ListingFailed {
        /// Diagnostic text reported by the backend.
        diagnostic: String,
    },

    /// A move invocation returned failure.
    #[error("Failed to move <{source_address}> to <{target}>: {diagnostic}")]
    MoveFailed {
        /// Address being moved.
        source_address: String,
        /// Destination address.
        target: String,
        /// Diagnostic text reported by the backend.
        diagnostic: String,
    },

    /// A remove invocation returned failure.
    #[error("Failed to remove <{target}>: {diagnostic}")]
    RemoveFailed {
        /// Address being removed.
        target: String,
        /// Diagnostic text reported by the backend.
        diagnostic: String,
    },

    /// An execution unit ended without reporting a result.
    #[error("Execution aborted: {message}")]
    Aborted {
        /// Description of the abort.
        message: String,
    },

    /// The backend executable could not be started.
    #[error("Failed to run {program}: {message}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Description of the failure.
        message: String,
    },
}

/// Planning errors. Any of these aborts the run before a mutation happens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    /// Target already exists in state and forced moves are not allowed.
    #[error("Resource <{target}> exists in state, must be force moved (-f flag)")]
    Collision {
        /// The occupied target address.
        target: String,
    },

    /// A target is itself the source of another planned move.
    #[error("Resource <{source_address}> would be moved onto <{target}>, which is also being moved")]
    OverlappingMove {
        /// Source whose target is contested.
        source_address: String,
        /// Target that is also a planned source.
        target: String,
    },

    /// No source prefix was given.
    #[error("Source namespace prefix must not be empty")]
    EmptySourcePrefix,

    /// The computed target for a source address is not a usable address.
    #[error("Resource <{source_address}> has no valid target address without a target prefix")]
    InvalidTarget {
        /// Source address that could not be mapped.
        source_address: String,
    },
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

impl MigrateError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a parse error with an optional location.
    #[must_use]
    pub fn parse(message: impl Into<String>, location: Option<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location,
        }
    }
}

impl StateError {
    /// Returns the diagnostic text carried by the error.
    #[must_use]
    pub fn diagnostic(&self) -> &str {
        match self {
            Self::ListingFailed { diagnostic }
            | Self::MoveFailed { diagnostic, .. }
            | Self::RemoveFailed { diagnostic, .. } => diagnostic,
            Self::Spawn { message, .. } | Self::Aborted { message } => message,
        }
    }
}
