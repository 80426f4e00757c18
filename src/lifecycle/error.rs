//! Shutdown error definitions.

use async_trait::async_trait;
use thiserror::Error;

use crate::lifecycle::shutdown::{ShutdownContext, Shutdownable};

/// Boxed error returned by arbitrary subsystem cleanup code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors a capability can report from its shutdown.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// The application reported a known failure; rendered with its message only.
    #[error(transparent)]
    App(#[from] AppError),

    /// The shared shutdown deadline expired before the capability finished.
    #[error("shutdown deadline exceeded")]
    DeadlineExceeded,

    /// The shutdown context was released before the capability finished.
    #[error("shutdown cancelled")]
    Cancelled,

    /// Any other failure from the capability's cleanup.
    #[error("{0}")]
    Other(BoxError),
}

impl ShutdownError {
    /// Wrap an arbitrary error.
    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::Other(err.into())
    }

    /// Whether this error came from the deadline context rather than the capability.
    pub fn is_deadline(&self) -> bool {
        matches!(self, Self::DeadlineExceeded | Self::Cancelled)
    }

    /// Whether the capability reported this failure itself.
    pub fn is_app(&self) -> bool {
        matches!(self, Self::App(_))
    }
}

impl From<std::io::Error> for ShutdownError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

/// A failure the application reports about itself.
///
/// An `AppError` is also a capability: registering one makes the run fail
/// during the drain with this message. Startup callbacks use it to report a
/// fatal setup error (see [`abort`](crate::lifecycle::startup::abort)).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AppError {
    message: String,
}

impl AppError {
    /// Create a new application error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Create a new application error ready for registration.
    pub fn boxed(message: impl Into<String>) -> Box<dyn Shutdownable> {
        Box::new(Self::new(message))
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[async_trait]
impl Shutdownable for AppError {
    fn name(&self) -> &str {
        "AppError"
    }

    async fn shutdown(&mut self, _ctx: &ShutdownContext) -> Result<(), ShutdownError> {
        Err(ShutdownError::App(self.clone()))
    }
}

/// Errors raised while subscribing to OS signals.
#[derive(Debug, Error)]
pub enum SignalError {
    /// The OS refused the signal subscription.
    #[error("failed to register signal handler: {0}")]
    Register(#[from] std::io::Error),
}
