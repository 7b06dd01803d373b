//! Bounded concurrent executor for migration plans.
//!
//! Every mapping runs in its own task. A shared semaphore caps how many of
//! them talk to the state backend at once; a failing mapping never stops or
//! rolls back the others.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::error::StateError;
use crate::state::StateBackend;

use super::plan::{MigrationPlan, MoveMapping};

/// Default number of mappings executed at once.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Executor for migration plans.
#[derive(Debug)]
pub struct MigrationExecutor<B: ?Sized> {
    /// State backend shared by every execution unit.
    backend: Arc<B>,
    /// Maximum number of mappings in flight.
    concurrency: usize,
}

/// Result of executing a single mapping.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    /// Position of the mapping in the plan.
    pub index: usize,
    /// Mapping that was executed.
    pub mapping: MoveMapping,
    /// Failure, if the mapping did not complete.
    pub error: Option<StateError>,
    /// Time spent holding an execution slot.
    pub elapsed: Duration,
}

/// Result of executing the entire plan.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Outcomes in completion order.
    pub outcomes: Vec<MoveOutcome>,
}

impl<B: StateBackend + ?Sized + 'static> MigrationExecutor<B> {
    /// Creates a new executor.
    ///
    /// `concurrency` is clamped to `1..=Semaphore::MAX_PERMITS`: zero is
    /// treated as one, and larger values as the semaphore's maximum.
    #[must_use]
    pub fn new(backend: Arc<B>, concurrency: usize) -> Self {
        Self {
            backend,
            concurrency: concurrency.clamp(1, Semaphore::MAX_PERMITS),
        }
    }

    /// Returns the maximum number of mappings in flight.
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Executes a migration plan.
    ///
    /// `on_outcome` is called once per mapping, as each one completes. The
    /// call returns only after every mapping has finished.
    pub async fn execute<F>(&self, plan: &MigrationPlan, mut on_outcome: F) -> ExecutionReport
    where
        F: FnMut(&MoveOutcome),
    {
        info!(
            "Executing migration plan with {} moves (concurrency {})",
            plan.len(),
            self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut pending: Vec<Option<MoveMapping>> = Vec::with_capacity(plan.len());

        for (index, mapping) in plan.mappings.iter().enumerate() {
            pending.push(Some(mapping.clone()));

            let backend = Arc::clone(&self.backend);
            let semaphore = Arc::clone(&semaphore);
            let mapping = mapping.clone();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return MoveOutcome {
                        index,
                        mapping,
                        error: Some(StateError::Aborted {
                            message: String::from("execution slots were closed"),
                        }),
                        elapsed: Duration::ZERO,
                    };
                };

                let started = Instant::now();
                let error = apply_mapping(backend.as_ref(), &mapping).await.err();

                MoveOutcome {
                    index,
                    mapping,
                    error,
                    elapsed: started.elapsed(),
                }
            });
        }

        let mut report = ExecutionReport {
            outcomes: Vec::with_capacity(plan.len()),
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    if let Some(slot) = pending.get_mut(outcome.index) {
                        *slot = None;
                    }
                    on_outcome(&outcome);
                    report.outcomes.push(outcome);
                }
                Err(e) => error!("Migration task ended abnormally: {e}"),
            }
        }

        // Anything still pending belongs to a task that panicked.
        for (index, mapping) in pending.into_iter().enumerate() {
            if let Some(mapping) = mapping {
                let outcome = MoveOutcome {
                    index,
                    mapping,
                    error: Some(StateError::Aborted {
                        message: String::from("execution task panicked"),
                    }),
                    elapsed: Duration::ZERO,
                };
                on_outcome(&outcome);
                report.outcomes.push(outcome);
            }
        }

        info!("{report}");
        report
    }
}

/// Applies a single mapping: remove the occupant first for forced moves,
/// then move.
async fn apply_mapping<B: StateBackend + ?Sized>(
    backend: &B,
    mapping: &MoveMapping,
) -> Result<(), StateError> {
    if mapping.requires_force {
        debug!("Removing occupant of <{}> before move", mapping.target);
        backend.remove_resource(&mapping.target).await?;
    }

    backend.move_resource(&mapping.source, &mapping.target).await
}

impl MoveOutcome {
    /// Returns true if the mapping was applied.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl ExecutionReport {
    /// Returns the number of mappings that were executed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns the number of successful mappings.
    #[must_use]
    pub fn successful(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Returns the number of failed mappings.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total() - self.successful()
    }

    /// Returns the failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &MoveOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Returns true if every mapping succeeded.
    #[must_use]
    pub fn all_successful(&self) -> bool {
        self.outcomes.iter().all(MoveOutcome::is_success)
    }
}

impl std::fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Executed {} moves: {} successful, {} failed",
            self.total(),
            self.successful(),
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlanBuilder;
    use crate::state::{MockStateBackend, NamespacePrefix, ResourceAddress};
    use async_trait::async_trait;
    use mockall::Sequence;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Backend that records calls and tracks how many overlap.
    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        failing_sources: HashSet<String>,
        delay: Duration,
    }

    impl RecordingBackend {
        fn with_delay(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::default()
            }
        }

        async fn track(&self, call: String) {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.calls.lock().unwrap().push(call);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StateBackend for RecordingBackend {
        async fn list_addresses(&self) -> Result<Vec<ResourceAddress>, StateError> {
            Ok(vec![])
        }

        async fn move_resource(
            &self,
            source: &ResourceAddress,
            target: &ResourceAddress,
        ) -> Result<(), StateError> {
            self.track(format!("mv {source} {target}")).await;
            if self.failing_sources.contains(source.as_str()) {
                return Err(StateError::MoveFailed {
                    source_address: source.to_string(),
                    target: target.to_string(),
                    diagnostic: String::from("refused"),
                });
            }
            Ok(())
        }

        async fn remove_resource(&self, target: &ResourceAddress) -> Result<(), StateError> {
            self.track(format!("rm {target}")).await;
            Ok(())
        }

        fn backend_type(&self) -> &'static str {
            "recording"
        }
    }

    fn plan(addresses: &[&str], force: bool) -> MigrationPlan {
        let addresses: Vec<ResourceAddress> = addresses.iter().map(|a| (*a).into()).collect();
        PlanBuilder::new(NamespacePrefix::new("app"), NamespacePrefix::new("new"))
            .with_force(force)
            .build(&addresses)
            .unwrap()
    }

    fn numbered_plan(count: usize) -> MigrationPlan {
        let addresses: Vec<String> = (0..count).map(|i| format!("app.r{i}")).collect();
        let refs: Vec<&str> = addresses.iter().map(String::as_str).collect();
        plan(&refs, false)
    }

    #[tokio::test]
    async fn test_plain_moves() {
        let backend = Arc::new(RecordingBackend::default());
        let executor = MigrationExecutor::new(Arc::clone(&backend), 1);

        let report = executor
            .execute(&plan(&["app.foo", "app.bar"], false), |_| {})
            .await;

        assert!(report.all_successful());
        assert_eq!(report.total(), 2);
        assert_eq!(backend.calls(), vec!["mv app.foo new.foo", "mv app.bar new.bar"]);
    }

    #[tokio::test]
    async fn test_concurrency_bound_is_respected() {
        let backend = Arc::new(RecordingBackend::with_delay(Duration::from_millis(10)));
        let executor = MigrationExecutor::new(Arc::clone(&backend), 3);

        let report = executor.execute(&numbered_plan(12), |_| {}).await;

        assert_eq!(report.successful(), 12);
        assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 3);
        assert_eq!(backend.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_default_concurrency_is_sequential() {
        let backend = Arc::new(RecordingBackend::with_delay(Duration::from_millis(2)));
        let executor = MigrationExecutor::new(Arc::clone(&backend), DEFAULT_CONCURRENCY);

        executor.execute(&numbered_plan(5), |_| {}).await;

        assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(backend.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_concurrency_is_clamped() {
        let backend = Arc::new(RecordingBackend::default());
        let executor = MigrationExecutor::new(backend, usize::MAX);
        assert_eq!(executor.concurrency(), Semaphore::MAX_PERMITS);
    }

    #[tokio::test]
    async fn test_zero_concurrency_runs_sequentially() {
        let backend = Arc::new(RecordingBackend::default());
        let executor = MigrationExecutor::new(Arc::clone(&backend), 0);
        assert_eq!(executor.concurrency(), 1);

        let report = executor.execute(&numbered_plan(3), |_| {}).await;
        assert_eq!(report.successful(), 3);
    }

    #[tokio::test]
    async fn test_outcomes_reported_as_they_complete() {
        let backend = Arc::new(RecordingBackend::with_delay(Duration::from_millis(1)));
        let executor = MigrationExecutor::new(backend, 4);
        let mut seen = Vec::new();

        let report = executor
            .execute(&numbered_plan(8), |outcome| seen.push(outcome.index))
            .await;

        assert_eq!(seen.len(), 8);
        let order: Vec<usize> = report.outcomes.iter().map(|o| o.index).collect();
        assert_eq!(seen, order);
        let unique: HashSet<usize> = seen.into_iter().collect();
        assert_eq!(unique.len(), 8);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_other_mappings() {
        let backend = Arc::new(RecordingBackend {
            failing_sources: HashSet::from([String::from("app.r0")]),
            ..RecordingBackend::default()
        });
        let executor = MigrationExecutor::new(Arc::clone(&backend), 1);

        let report = executor.execute(&numbered_plan(4), |_| {}).await;

        assert_eq!(report.total(), 4);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.successful(), 3);
        let failed: Vec<&str> = report.failures().map(|o| o.mapping.source.as_str()).collect();
        assert_eq!(failed, vec!["app.r0"]);
        assert_eq!(backend.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_forced_move_removes_before_moving() {
        let mut backend = MockStateBackend::new();
        let mut seq = Sequence::new();

        backend
            .expect_remove_resource()
            .withf(|target| target.as_str() == "new.foo")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        backend
            .expect_move_resource()
            .withf(|source, target| source.as_str() == "app.foo" && target.as_str() == "new.foo")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let executor = MigrationExecutor::new(Arc::new(backend), 1);
        let report = executor
            .execute(&plan(&["app.foo", "new.foo"], true), |_| {})
            .await;

        assert!(report.all_successful());
    }

    #[tokio::test]
    async fn test_failed_remove_skips_move() {
        let mut backend = MockStateBackend::new();

        backend.expect_remove_resource().times(1).returning(|target| {
            Err(StateError::RemoveFailed {
                target: target.to_string(),
                diagnostic: String::from("state is locked"),
            })
        });
        backend.expect_move_resource().times(0);

        let executor = MigrationExecutor::new(Arc::new(backend), 1);
        let report = executor
            .execute(&plan(&["app.foo", "new.foo"], true), |_| {})
            .await;

        assert_eq!(report.failed(), 1);
        assert_eq!(
            report.outcomes[0].error,
            Some(StateError::RemoveFailed {
                target: String::from("new.foo"),
                diagnostic: String::from("state is locked"),
            })
        );
    }

    #[tokio::test]
    async fn test_failed_remove_leaves_other_mappings_alone() {
        let mut backend = MockStateBackend::new();

        backend
            .expect_remove_resource()
            .returning(|target| {
                Err(StateError::RemoveFailed {
                    target: target.to_string(),
                    diagnostic: String::from("boom"),
                })
            });
        backend
            .expect_move_resource()
            .withf(|source, _| source.as_str() == "app.bar")
            .times(1)
            .returning(|_, _| Ok(()));

        let executor = MigrationExecutor::new(Arc::new(backend), 2);
        let report = executor
            .execute(&plan(&["app.foo", "new.foo", "app.bar"], true), |_| {})
            .await;

        assert_eq!(report.total(), 2);
        assert_eq!(report.successful(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[tokio::test]
    async fn test_empty_plan() {
        let backend = Arc::new(RecordingBackend::default());
        let executor = MigrationExecutor::new(Arc::clone(&backend), 4);

        let report = executor.execute(&plan(&["other.x"], false), |_| {}).await;

        assert_eq!(report.total(), 0);
        assert!(report.all_successful());
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_report_display() {
        let report = ExecutionReport::default();
        assert_eq!(report.to_string(), "Executed 0 moves: 0 successful, 0 failed");
    }
}
