//! Request-scoped context for pipeline execution.
//!
//! This module provides:
//! - The mutable per-request context seen by every interceptor
//! - The response state accumulated during the chain
//! - Typed features exchanged between interceptors

mod features;
mod request;
mod response;

pub use features::ReExecutionFeature;
pub use request::RequestContext;
pub use response::ResponseState;
