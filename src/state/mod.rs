//! State access for the migration tool.
//!
//! This module provides the resource address types and the backend that
//! lists, moves and removes entries in the Terraform state.

mod store;
mod terraform;
mod types;

pub use store::StateBackend;
#[cfg(test)]
pub use store::MockStateBackend;
pub use terraform::{parse_listing, TerraformCli, DEFAULT_TERRAFORM_BIN};
pub use types::{NamespacePrefix, ResourceAddress, SEGMENT_SEPARATOR};
