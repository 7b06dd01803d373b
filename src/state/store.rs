//! State backend trait definition.
//!
//! This module defines the interface to the external state-management
//! primitives the migration drives: list, move and remove.

use async_trait::async_trait;

use crate::error::StateError;
use super::types::ResourceAddress;

/// Trait for state-management backends.
///
/// Every call is a synchronous round-trip from the caller's point of view and
/// mutates (or reads) the shared remote state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StateBackend: Send + Sync {
    /// Lists every address currently tracked in state.
    async fn list_addresses(&self) -> Result<Vec<ResourceAddress>, StateError>;

    /// Renames `source` to `target`.
    ///
    /// Fails if `target` is already occupied.
    async fn move_resource(
        &self,
        source: &ResourceAddress,
        target: &ResourceAddress,
    ) -> Result<(), StateError>;

    /// Removes `target` from state.
    async fn remove_resource(&self, target: &ResourceAddress) -> Result<(), StateError>;

    /// Gets the backend type name.
    fn backend_type(&self) -> &'static str;
}

