//! Graceful application lifecycle library.
//!
//! Starts an application, waits for SIGINT/SIGTERM or an internal
//! cancellation, then stops every registered subsystem within one shared
//! deadline and turns the result into a process exit code.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod worker;

pub use config::AppConfig;
pub use lifecycle::{Lifecycle, RunReport, Shutdownable};
