//! Background workers.
//!
//! # Data Flow
//! ```text
//! Periodic timer (ticker.rs)
//!     → Do a unit of work
//!     → Repeat until stopped by the drain
//! ```

pub mod ticker;

pub use ticker::Ticker;
