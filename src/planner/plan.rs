//! Migration plan types and construction.
//!
//! This module turns a snapshot of state addresses into an ordered list of
//! move mappings, enforcing the collision rules before anything is mutated.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::error::PlanError;
use crate::state::{NamespacePrefix, ResourceAddress};

/// A complete migration plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationPlan {
    /// When the plan was created.
    pub created_at: DateTime<Utc>,
    /// Namespace the resources are moved out of.
    pub source_prefix: NamespacePrefix,
    /// Namespace the resources are moved into.
    pub target_prefix: NamespacePrefix,
    /// Planned moves in snapshot order.
    pub mappings: Vec<MoveMapping>,
    /// Addresses outside the source namespace.
    pub skipped: Vec<ResourceAddress>,
}

/// A single planned rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveMapping {
    /// Address being moved.
    pub source: ResourceAddress,
    /// Address it is moved to.
    pub target: ResourceAddress,
    /// Whether the current occupant of `target` is removed first.
    pub requires_force: bool,
}

/// Builder for migration plans.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    /// Namespace to move out of.
    source: NamespacePrefix,
    /// Namespace to move into (empty re-roots at the top level).
    target: NamespacePrefix,
    /// Whether occupied targets may be overwritten.
    force_allowed: bool,
    /// Timestamp recorded on built plans.
    created_at: DateTime<Utc>,
}

impl PlanBuilder {
    /// Creates a builder for moving `source` to `target`. Forced moves are
    /// disallowed until [`Self::with_force`] enables them, and plans are
    /// stamped with the Unix epoch until [`Self::with_created_at`] is set.
    #[must_use]
    pub const fn new(source: NamespacePrefix, target: NamespacePrefix) -> Self {
        Self {
            source,
            target,
            force_allowed: false,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Sets the timestamp recorded on built plans.
    #[must_use]
    pub const fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Sets whether occupied targets may be overwritten.
    #[must_use]
    pub const fn with_force(mut self, force_allowed: bool) -> Self {
        self.force_allowed = force_allowed;
        self
    }

    /// Builds a plan from a snapshot of every address in state.
    ///
    /// Planning is fail-fast: the first collision aborts the whole plan. The
    /// result depends only on the snapshot and the builder settings.
    ///
    /// # Errors
    ///
    /// - [`PlanError::EmptySourcePrefix`] if no source namespace was given.
    /// - [`PlanError::InvalidTarget`] if a source cannot be re-rooted.
    /// - [`PlanError::Collision`] if a target is occupied and force is off.
    /// - [`PlanError::OverlappingMove`] if a forced target is also a planned
    ///   source.
    pub fn build(&self, addresses: &[ResourceAddress]) -> Result<MigrationPlan, PlanError> {
        if self.source.is_empty() {
            return Err(PlanError::EmptySourcePrefix);
        }

        let existing: HashSet<&str> = addresses.iter().map(ResourceAddress::as_str).collect();
        let mut seen: HashSet<&str> = HashSet::with_capacity(addresses.len());
        let mut mappings = Vec::new();
        let mut skipped = Vec::new();

        for address in addresses {
            if address.is_empty() || !seen.insert(address.as_str()) {
                continue;
            }

            let Some(remainder) = self.source.strip_from(address.as_str()) else {
                debug!("Skipping <{address}> resource");
                skipped.push(address.clone());
                continue;
            };

            let target = self
                .target
                .join(remainder)
                .ok_or_else(|| PlanError::InvalidTarget {
                    source_address: address.to_string(),
                })?;

            if &target == address {
                debug!("Resource <{address}> is already at its target");
                skipped.push(address.clone());
                continue;
            }

            let requires_force = existing.contains(target.as_str());
            if requires_force && !self.force_allowed {
                return Err(PlanError::Collision {
                    target: target.to_string(),
                });
            }

            // The occupant is itself moving; removing it would race its move.
            if requires_force && self.source.strip_from(target.as_str()).is_some() {
                return Err(PlanError::OverlappingMove {
                    source_address: address.to_string(),
                    target: target.to_string(),
                });
            }

            mappings.push(MoveMapping {
                source: address.clone(),
                target,
                requires_force,
            });
        }

        debug!(
            "Planned {} moves, skipped {} resources",
            mappings.len(),
            skipped.len()
        );

        Ok(MigrationPlan {
            created_at: self.created_at,
            source_prefix: self.source.clone(),
            target_prefix: self.target.clone(),
            mappings,
            skipped,
        })
    }
}

impl MigrationPlan {
    /// Returns true if the plan moves nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Returns the number of planned moves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns the number of moves that overwrite an existing address.
    #[must_use]
    pub fn forced_count(&self) -> usize {
        self.mappings.iter().filter(|m| m.requires_force).count()
    }
}

impl std::fmt::Display for MoveMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}> => <{}>", self.source, self.target)?;
        if self.requires_force {
            write!(f, " (forced)")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for MigrationPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.mappings.is_empty() {
            return write!(f, "No resources to move");
        }

        writeln!(f, "Migration Plan ({} moves):", self.mappings.len())?;
        for mapping in &self.mappings {
            writeln!(f, "  {mapping}")?;
        }

        Ok(())
    }
}
