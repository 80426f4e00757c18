//! Demo HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing and timeout layers)
//!     → work handler (simulated long request, aborts on lifecycle cancellation)
//!     → Send to client
//!
//! Shutdown:
//!     lifecycle cancelled → in-flight handlers return early
//!     drain → stop accepting → wait for connections within the deadline
//! ```

pub mod server;

pub use server::WebServer;
