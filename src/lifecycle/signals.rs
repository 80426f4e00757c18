//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGINT, SIGTERM) before application logic runs
//! - Translate the first received signal to a [`TerminationReason`]
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Subscription happens synchronously in `install`, a dedicated task waits
//! - A received signal is consumed exactly once; the listener never exits the process
//! - Non-Unix platforms are best-effort

use std::fmt;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::lifecycle::error::SignalError;

/// What triggered the shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// SIGINT / Ctrl+C.
    Interrupt,
    /// SIGTERM / console close.
    Terminate,
    /// The application cancelled the lifecycle context itself.
    Application,
    /// Any other platform notification.
    Other,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::Interrupt => "interrupt",
            TerminationReason::Terminate => "terminate",
            TerminationReason::Application => "application",
            TerminationReason::Other => "other",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives the first termination signal of the run.
#[derive(Debug)]
pub struct SignalListener {
    rx: Option<oneshot::Receiver<TerminationReason>>,
    task: Option<JoinHandle<()>>,
}

impl SignalListener {
    /// Subscribe to the process's termination signals.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn install() -> Result<Self, SignalError> {
        let (tx, rx) = oneshot::channel();
        let task = spawn_os_listener(tx)?;
        tracing::debug!("Signal handlers registered");
        Ok(Self {
            rx: Some(rx),
            task: Some(task),
        })
    }

    /// A listener driven by hand instead of by the OS.
    pub fn manual() -> (SignalTrigger, Self) {
        let (tx, rx) = oneshot::channel();
        (
            SignalTrigger { tx },
            Self {
                rx: Some(rx),
                task: None,
            },
        )
    }

    /// A listener that never fires.
    pub fn disabled() -> Self {
        Self { rx: None, task: None }
    }

    /// Wait for the termination signal.
    ///
    /// Returns `None` if no signal can arrive anymore: the listener is
    /// disabled, its source went away, or the signal was already consumed.
    pub async fn recv(&mut self) -> Option<TerminationReason> {
        let rx = self.rx.take()?;
        rx.await.ok()
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Sending half of a [`SignalListener::manual`] listener.
#[derive(Debug)]
pub struct SignalTrigger {
    tx: oneshot::Sender<TerminationReason>,
}

impl SignalTrigger {
    /// Deliver a termination signal. Returns `false` if the listener is gone.
    pub fn send(self, reason: TerminationReason) -> bool {
        self.tx.send(reason).is_ok()
    }
}

#[cfg(unix)]
fn spawn_os_listener(
    tx: oneshot::Sender<TerminationReason>,
) -> Result<JoinHandle<()>, SignalError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        let reason = tokio::select! {
            Some(()) = sigint.recv() => TerminationReason::Interrupt,
            Some(()) = sigterm.recv() => TerminationReason::Terminate,
            else => return,
        };
        tracing::info!(signal = %reason, "Termination signal received");
        let _ = tx.send(reason);
    }))
}

#[cfg(windows)]
fn spawn_os_listener(
    tx: oneshot::Sender<TerminationReason>,
) -> Result<JoinHandle<()>, SignalError> {
    use tokio::signal::windows;

    let mut ctrl_c = windows::ctrl_c()?;
    let mut ctrl_close = windows::ctrl_close()?;
    let mut ctrl_break = windows::ctrl_break()?;

    Ok(tokio::spawn(async move {
        let reason = tokio::select! {
            Some(()) = ctrl_c.recv() => TerminationReason::Interrupt,
            Some(()) = ctrl_close.recv() => TerminationReason::Terminate,
            Some(()) = ctrl_break.recv() => TerminationReason::Other,
            else => return,
        };
        tracing::info!(signal = %reason, "Termination signal received");
        let _ = tx.send(reason);
    }))
}

#[cfg(not(any(unix, windows)))]
fn spawn_os_listener(
    tx: oneshot::Sender<TerminationReason>,
) -> Result<JoinHandle<()>, SignalError> {
    Ok(tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl+C handler unavailable");
            return;
        }
        tracing::info!("Termination signal received");
        let _ = tx.send(TerminationReason::Interrupt);
    }))
}
