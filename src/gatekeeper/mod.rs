//! Request gatekeeping subsystem.
//!
//! # Data Flow
//! ```text
//! http::Request parts
//!     → request.rs (RequestDescriptor)
//!     → pipeline.rs
//!         → static_assets.rs (short-circuit)
//!         → auth_error.rs (auth error redirect)
//!         → locale/resolver.rs (locale)
//!         → redirect.rs (safe Location)
//!         → security/headers.rs (decoration)
//!     → response.rs (ResponseDescriptor)
//!     → http/middleware.rs (apply to the real response)
//! ```

pub mod auth_error;
pub mod pipeline;
pub mod redirect;
pub mod request;
pub mod response;
pub mod static_assets;

pub use pipeline::{GateAction, GateOutcome, Gatekeeper};
pub use request::RequestDescriptor;
pub use response::ResponseDescriptor;
