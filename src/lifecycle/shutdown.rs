//! Shutdown coordination.
//!
//! # Responsibilities
//! - Define the capability every stoppable subsystem implements
//! - Bind one shared deadline to a fresh shutdown context per drain
//! - Stop every registered capability and aggregate the results
//!
//! # Design Decisions
//! - Capabilities are stopped sequentially, in registration order
//! - The deadline is shared: a slow capability eats into the budget of later ones
//! - No short-circuit: a failure is recorded and the drain moves on
//! - No preemption: a capability that ignores its context can overrun the deadline

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::error::ShutdownError;
use crate::observability::metrics;

/// Roughly thirty years.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// A subsystem that can be asked to stop within a deadline.
#[async_trait]
pub trait Shutdownable: Send {
    /// Identity used when reporting this capability's failures.
    ///
    /// Defaults to the implementing type's name without its module path.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Stop the subsystem.
    ///
    /// Must return once cleanup is complete or `ctx` is done, whichever
    /// comes first. Called at most once per run.
    async fn shutdown(&mut self, ctx: &ShutdownContext) -> Result<(), ShutdownError>;
}

/// Deadline-bound context handed to every capability during a drain.
///
/// Independent of the run's root context, which is already cancelled by the
/// time the drain starts.
#[derive(Debug, Clone)]
pub struct ShutdownContext {
    token: CancellationToken,
    deadline: Instant,
}

impl ShutdownContext {
    /// Create a context that expires `timeout` from now.
    ///
    /// Timeouts too large to represent are clamped to a far-future instant.
    pub fn new(timeout: Duration) -> Self {
        let now = Instant::now();
        Self {
            token: CancellationToken::new(),
            deadline: now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE),
        }
    }

    /// Absolute expiry of this context.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Budget left before the deadline.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whether the context has expired or been released.
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ShutdownError> {
        if Instant::now() >= self.deadline {
            Some(ShutdownError::DeadlineExceeded)
        } else if self.token.is_cancelled() {
            Some(ShutdownError::Cancelled)
        } else {
            None
        }
    }

    /// Resolves when the deadline passes or the context is released.
    pub async fn cancelled(&self) {
        tokio::select! {
            _ = self.token.cancelled() => {}
            _ = tokio::time::sleep_until(self.deadline) => {}
        }
    }

    /// Race `fut` against this context.
    ///
    /// Returns the future's result if it finishes first, otherwise the
    /// context's error.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ShutdownError>
    where
        F: Future<Output = Result<T, ShutdownError>>,
    {
        tokio::select! {
            result = fut => result,
            _ = self.cancelled() => Err(self.err().unwrap_or(ShutdownError::DeadlineExceeded)),
        }
    }

    /// Wait for a spawned task within this context.
    ///
    /// The task is aborted if the context ends before it finishes.
    pub async fn join<T>(&self, mut task: JoinHandle<T>) -> Result<T, ShutdownError> {
        let joined = self
            .run(async { (&mut task).await.map_err(ShutdownError::other) })
            .await;
        if joined.is_err() && !task.is_finished() {
            task.abort();
        }
        joined
    }

    fn release(&self) {
        self.token.cancel();
    }
}

/// Result of stopping a single capability.
#[derive(Debug)]
pub struct ShutdownRecord {
    /// Registration index of the capability.
    pub position: usize,
    /// Capability identity.
    pub name: String,
    /// What its shutdown returned.
    pub result: Result<(), ShutdownError>,
    /// Time spent inside its shutdown.
    pub elapsed: Duration,
}

impl ShutdownRecord {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&ShutdownError> {
        self.result.as_ref().err()
    }
}

/// Aggregate result of a drain, in registration order.
#[derive(Debug, Default)]
pub struct ShutdownOutcome {
    records: Vec<ShutdownRecord>,
    elapsed: Duration,
    overran: bool,
}

impl ShutdownOutcome {
    pub fn records(&self) -> &[ShutdownRecord] {
        &self.records
    }

    pub fn failures(&self) -> impl Iterator<Item = &ShutdownRecord> {
        self.records.iter().filter(|r| !r.is_success())
    }

    pub fn successes(&self) -> impl Iterator<Item = &ShutdownRecord> {
        self.records.iter().filter(|r| r.is_success())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// True when no capability reported an error.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Wall time of the whole drain.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether the drain finished after the shared deadline.
    pub fn overran(&self) -> bool {
        self.overran
    }
}

/// Drives the bounded-time shutdown of all registered capabilities.
#[derive(Debug, Clone, Copy)]
pub struct ShutdownCoordinator {
    deadline: Duration,
}

impl ShutdownCoordinator {
    /// Create a coordinator with the given shared deadline.
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Stop every capability and return the aggregated outcome.
    pub async fn drain(&self, capabilities: &mut [Box<dyn Shutdownable>]) -> ShutdownOutcome {
        self.drain_with(capabilities, |_| {}).await
    }

    /// Like [`drain`](Self::drain), calling `on_record` as each capability finishes.
    pub async fn drain_with<F>(
        &self,
        capabilities: &mut [Box<dyn Shutdownable>],
        mut on_record: F,
    ) -> ShutdownOutcome
    where
        F: FnMut(&ShutdownRecord),
    {
        let ctx = ShutdownContext::new(self.deadline);
        let started = Instant::now();
        let mut records = Vec::with_capacity(capabilities.len());

        tracing::info!(
            capabilities = capabilities.len(),
            deadline_ms = self.deadline.as_millis() as u64,
            "Draining capabilities"
        );

        for (position, capability) in capabilities.iter_mut().enumerate() {
            let name = capability.name().to_string();
            let begun = Instant::now();
            let result = capability.shutdown(&ctx).await;
            let elapsed = begun.elapsed();

            match &result {
                Ok(()) => tracing::debug!(
                    capability = %name,
                    position,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Capability stopped"
                ),
                Err(e) => tracing::warn!(
                    capability = %name,
                    position,
                    error = %e,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Capability shutdown failed"
                ),
            }
            metrics::record_shutdown(&name, result.is_ok(), elapsed);

            let record = ShutdownRecord {
                position,
                name,
                result,
                elapsed,
            };
            on_record(&record);
            records.push(record);
        }

        ctx.release();

        let elapsed = started.elapsed();
        let overran = elapsed > self.deadline;
        if overran {
            tracing::warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                deadline_ms = self.deadline.as_millis() as u64,
                "Drain overran its deadline; a capability ignored cancellation"
            );
        }

        ShutdownOutcome {
            records,
            elapsed,
            overran,
        }
    }
}
