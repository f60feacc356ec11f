//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     process scope: trigger → server drains
//!     server scope:  trigger → sweeper stops (aborted after grace)
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: stop accept, drain in-flight requests, stop sweeper

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
