//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (controller.rs, startup.rs):
//!     Install signal handlers → Create context → Run startup callback → Collect capabilities
//!
//! Wait (controller.rs, signals.rs, context.rs):
//!     SIGINT/SIGTERM ─┐
//!                     ├→ first one wins → Cancel context
//!     cancel()       ─┘
//!
//! Shutdown (shutdown.rs):
//!     Fresh deadline context → Stop each capability in order → Aggregate outcome → Exit code
//! ```
//!
//! # Design Decisions
//! - One context per run; cancellation is idempotent
//! - Shutdown is sequential and shares one deadline across all capabilities
//! - Failures are reported, never re-thrown; the exit code is the only escalation

pub mod context;
pub mod controller;
pub mod error;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use context::{CancelHandle, LifecycleContext};
pub use controller::{run, run_with_timeout, Lifecycle, RunReport};
pub use error::{AppError, ShutdownError, SignalError};
pub use shutdown::{ShutdownContext, ShutdownCoordinator, ShutdownOutcome, ShutdownRecord, Shutdownable};
pub use signals::{SignalListener, SignalTrigger, TerminationReason};
pub use startup::{abort, Capabilities};
