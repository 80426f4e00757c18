//! Run-scoped cancellation.
//!
//! # Responsibilities
//! - Carry the single cancelled flag shared by the controller and the application
//! - Record the cause of the first cancellation
//! - Hand out cancellation handles and child tokens to subsystems
//!
//! # Design Decisions
//! - Backed by a `CancellationToken`; clones observe the same state
//! - The cause is set-once: the first cancellation wins, later ones are no-ops

use std::sync::{Arc, OnceLock};

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// The run's cancellable root context.
///
/// Exactly one is created per run. Cloning is cheap and every clone observes
/// the same cancellation.
#[derive(Debug, Clone, Default)]
pub struct LifecycleContext {
    token: CancellationToken,
    cause: Arc<OnceLock<Option<String>>>,
}

impl LifecycleContext {
    /// Create a fresh, uncancelled context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that can cancel this context.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle { ctx: self.clone() }
    }

    /// Whether the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the context is cancelled. Returns immediately if it already is.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Cause recorded by the first cancellation, if one was given.
    pub fn cause(&self) -> Option<String> {
        self.cause.get().cloned().flatten()
    }

    /// A child token cancelled together with this context.
    ///
    /// Cancelling the child does not cancel the context.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    fn cancel_inner(&self, cause: Option<String>) {
        if self.cause.set(cause).is_ok() {
            tracing::debug!(cause = ?self.cause(), "Lifecycle context cancelled");
        }
        self.token.cancel();
    }
}

/// The cancellation function handed to the startup callback.
///
/// Safe to call from any task, any number of times.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    ctx: LifecycleContext,
}

impl CancelHandle {
    /// Cancel the run without a cause.
    pub fn cancel(&self) {
        self.ctx.cancel_inner(None);
    }

    /// Cancel the run, recording why. Ignored if the run is already cancelled.
    pub fn cancel_with(&self, cause: impl Into<String>) {
        self.ctx.cancel_inner(Some(cause.into()));
    }

    /// Whether the run has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.ctx.is_cancelled()
    }
}
