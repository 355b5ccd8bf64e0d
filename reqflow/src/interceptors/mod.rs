//! Interceptors (middleware) wrapping request execution.

mod chain;
mod exception_audit;
mod reexecute;

pub use chain::{endpoint_fn, Endpoint, FnEndpoint, Interceptor, Next, Outcome};
pub use exception_audit::ExceptionAuditInterceptor;
pub use reexecute::{ReExecutionGuard, StatusCodeReExecuteInterceptor};
