//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → middleware.rs (gatekeeper: bypass, redirect, or decorate)
//!     → page handler (downstream)
//!     → Send to client
//! ```

pub mod middleware;
pub mod server;

pub use server::{AppState, HttpServer};
