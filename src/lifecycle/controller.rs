//! Lifecycle controller.
//!
//! # Responsibilities
//! - Own the run's single lifecycle context and its cancellation handle
//! - Run the startup callback and collect the capabilities it registers
//! - Wait for an OS signal or an internal cancellation, whichever comes first
//! - Drain the capabilities once and turn the outcome into an exit code
//!
//! # Design Decisions
//! - Signal handlers are installed before the startup callback runs
//! - The wait is an unbiased race: when both are ready either may win
//! - The drain runs exactly once, always after the context is cancelled

use std::io::{Stdout, Write};
use std::process::ExitCode;
use std::time::Duration;

use crate::config::{ColorMode, LifecycleConfig};
use crate::lifecycle::context::{CancelHandle, LifecycleContext};
use crate::lifecycle::shutdown::{ShutdownCoordinator, ShutdownOutcome};
use crate::lifecycle::signals::{SignalListener, TerminationReason};
use crate::lifecycle::startup::Capabilities;
use crate::observability::metrics;
use crate::observability::Reporter;

/// What happened during a run.
#[derive(Debug)]
pub struct RunReport {
    /// What triggered the shutdown.
    pub reason: TerminationReason,
    /// Cause recorded on the lifecycle context, if any.
    pub cause: Option<String>,
    /// Per-capability shutdown results.
    pub outcome: ShutdownOutcome,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// `0` on a clean shutdown, `1` if any capability failed.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

impl From<&RunReport> for ExitCode {
    fn from(report: &RunReport) -> Self {
        ExitCode::from(report.exit_code())
    }
}

/// Drives one application run from startup to exit code.
#[derive(Debug)]
pub struct Lifecycle<W = Stdout> {
    deadline: Duration,
    reporter: Reporter<W>,
}

impl Lifecycle<Stdout> {
    /// Controller reporting to stdout with the configured deadline and color.
    pub fn new(config: &LifecycleConfig) -> Self {
        Self::with_reporter(config.shutdown_timeout(), Reporter::stdout(config.color))
    }
}

impl<W: Write> Lifecycle<W> {
    pub fn with_reporter(deadline: Duration, reporter: Reporter<W>) -> Self {
        Self { deadline, reporter }
    }

    /// Shared budget for the drain.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run the application, listening for the process's termination signals.
    ///
    /// If signal handlers cannot be registered the run still completes, but
    /// only an internal cancellation can end it.
    pub async fn run<F>(self, startup: F) -> RunReport
    where
        F: FnOnce(&LifecycleContext, CancelHandle) -> Capabilities,
    {
        let signals = match SignalListener::install() {
            Ok(listener) => listener,
            Err(e) => {
                tracing::warn!(error = %e, "Signal handlers unavailable, waiting for internal cancellation only");
                SignalListener::disabled()
            }
        };
        self.run_with_signals(signals, startup).await
    }

    /// Run the application with a caller-supplied signal source.
    pub async fn run_with_signals<F>(mut self, mut signals: SignalListener, startup: F) -> RunReport
    where
        F: FnOnce(&LifecycleContext, CancelHandle) -> Capabilities,
    {
        let ctx = LifecycleContext::new();
        let cancel = ctx.cancel_handle();

        tracing::info!(
            deadline_secs = self.deadline.as_secs(),
            "Application starting"
        );
        self.reporter.started(self.deadline);

        let mut capabilities = startup(&ctx, cancel.clone());
        tracing::debug!(
            capabilities = capabilities.len(),
            "Startup callback returned"
        );

        let reason = tokio::select! {
            _ = ctx.cancelled() => TerminationReason::Application,
            reason = wait_for_signal(&mut signals) => reason,
        };

        match reason {
            TerminationReason::Application => cancel.cancel(),
            signal => cancel.cancel_with(format!("{signal} signal")),
        }

        tracing::info!(
            reason = %reason,
            cause = ?ctx.cause(),
            capabilities = capabilities.len(),
            "Shutting down"
        );
        self.reporter.shutting_down(reason, self.deadline);

        let coordinator = ShutdownCoordinator::new(self.deadline);
        let reporter = &mut self.reporter;
        let outcome = coordinator
            .drain_with(&mut capabilities, |record| reporter.failure(record))
            .await;
        drop(capabilities);

        self.reporter.finished(&outcome, self.deadline);
        metrics::record_run(reason, outcome.is_success());

        if outcome.is_success() {
            tracing::info!(
                elapsed_ms = outcome.elapsed().as_millis() as u64,
                "Shutdown complete"
            );
        } else {
            tracing::error!(
                failures = outcome.failure_count(),
                elapsed_ms = outcome.elapsed().as_millis() as u64,
                "Shutdown completed with errors"
            );
        }

        RunReport {
            reason,
            cause: ctx.cause(),
            outcome,
        }
    }
}

/// Run with the default configuration (8 second deadline, no color).
pub async fn run<F>(startup: F) -> RunReport
where
    F: FnOnce(&LifecycleContext, CancelHandle) -> Capabilities,
{
    Lifecycle::new(&LifecycleConfig::default()).run(startup).await
}

/// Run with the given shutdown deadline and otherwise default configuration.
pub async fn run_with_timeout<F>(deadline: Duration, startup: F) -> RunReport
where
    F: FnOnce(&LifecycleContext, CancelHandle) -> Capabilities,
{
    Lifecycle::with_reporter(deadline, Reporter::stdout(ColorMode::default()))
        .run(startup)
        .await
}

async fn wait_for_signal(signals: &mut SignalListener) -> TerminationReason {
    match signals.recv().await {
        Some(reason) => reason,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::lifecycle::error::{AppError, ShutdownError};
    use crate::lifecycle::shutdown::{ShutdownContext, Shutdownable};
    use crate::lifecycle::startup::abort;

    struct Budget(Arc<Mutex<Option<Duration>>>);

    #[async_trait]
    impl Shutdownable for Budget {
        async fn shutdown(&mut self, ctx: &ShutdownContext) -> Result<(), ShutdownError> {
            *self.0.lock().unwrap() = Some(ctx.remaining());
            Ok(())
        }
    }

    fn quiet(deadline: Duration) -> Lifecycle<Vec<u8>> {
        Lifecycle::with_reporter(deadline, Reporter::new(Vec::new(), false))
    }

    #[test]
    fn test_exit_code_mapping() {
        let report = RunReport {
            reason: TerminationReason::Interrupt,
            cause: None,
            outcome: ShutdownOutcome::default(),
        };
        assert_eq!(report.exit_code(), 0);
        assert_eq!(ExitCode::from(&report), ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_internal_cancel_ends_run() {
        let (_trigger, signals) = SignalListener::manual();
        let report = quiet(Duration::from_secs(1))
            .run_with_signals(signals, |_ctx, cancel| {
                cancel.cancel_with("listener failed");
                Vec::new()
            })
            .await;

        assert_eq!(report.reason, TerminationReason::Application);
        assert_eq!(report.cause.as_deref(), Some("listener failed"));
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_abort_reports_app_error() {
        let report = quiet(Duration::from_secs(1))
            .run_with_signals(SignalListener::disabled(), |_ctx, cancel| {
                abort(&cancel, vec![AppError::boxed("no database")])
            })
            .await;

        assert_eq!(report.reason, TerminationReason::Application);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.outcome.failure_count(), 1);
    }

    #[tokio::test]
    async fn test_signal_records_cause() {
        let (trigger, signals) = SignalListener::manual();
        trigger.send(TerminationReason::Interrupt);

        let report = quiet(Duration::from_secs(1))
            .run_with_signals(signals, |_ctx, _cancel| Vec::new())
            .await;

        assert_eq!(report.reason, TerminationReason::Interrupt);
        assert_eq!(report.cause.as_deref(), Some("interrupt signal"));
    }

    #[tokio::test]
    async fn test_run_with_timeout_keeps_subsecond_deadline() {
        let seen = Arc::new(Mutex::new(None));
        let budget = Budget(seen.clone());

        let report = run_with_timeout(Duration::from_millis(1500), move |_ctx, cancel| {
            cancel.cancel();
            vec![Box::new(budget) as Box<dyn Shutdownable>]
        })
        .await;

        assert_eq!(report.exit_code(), 0);
        let remaining = seen.lock().unwrap().expect("capability was drained");
        assert!(remaining > Duration::from_secs(1));
        assert!(remaining <= Duration::from_millis(1500));
    }
}
