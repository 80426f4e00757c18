//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle events:
//!     → report.rs (human-readable status lines on stdout)
//!     → logging.rs (structured tracing events on stderr)
//!     → metrics.rs (shutdown counters and durations)
//! ```
//!
//! # Design Decisions
//! - The report is for operators at a terminal; logs are for diagnosis
//! - Neither output influences control flow or the exit code
//! - Metrics are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
pub mod report;

pub use report::Reporter;
