//! Startup registration.
//!
//! # Responsibilities
//! - Define the shape of the application's startup callback
//! - Provide the early-abort helper for fatal setup errors
//!
//! # Design Decisions
//! - The callback runs once, synchronously, and must return promptly
//! - Background work is spawned by the callback before it returns
//! - A fatal setup error cancels the run; the drain then reports it

use crate::lifecycle::context::CancelHandle;
use crate::lifecycle::shutdown::Shutdownable;

/// Capabilities returned by the startup callback, in shutdown order.
pub type Capabilities = Vec<Box<dyn Shutdownable>>;

/// Cancel the run and hand back the capabilities started so far.
///
/// Typically called with an [`AppError`](crate::lifecycle::error::AppError)
/// among `capabilities` so the failure is reported during the drain.
pub fn abort(cancel: &CancelHandle, capabilities: Capabilities) -> Capabilities {
    tracing::warn!(
        capabilities = capabilities.len(),
        "Startup aborted, cancelling run"
    );
    cancel.cancel_with("startup aborted");
    capabilities
}
