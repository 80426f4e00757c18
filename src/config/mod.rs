//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → command-line overrides applied by the binary
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty or missing file is a valid config
//! - Validation separates syntactic (serde) from semantic checks
//! - Color output is an explicit option, never sniffed from the raw command line

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AppConfig;
pub use schema::ColorMode;
pub use schema::LifecycleConfig;
pub use schema::ObservabilityConfig;
pub use schema::ServerConfig;
pub use schema::TickerConfig;
