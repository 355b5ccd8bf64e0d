//! Interceptor chain with nested `next` continuations.
//!
//! Interceptor *i* wraps interceptors *i+1..n* and the endpoint. Unwinding
//! is strictly LIFO: the interceptor that entered last returns first.

use crate::context::RequestContext;
use crate::errors::Fault;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Result of running (part of) the chain.
///
/// `Ok(())` means the response in the context is final as far as this stage
/// is concerned; `Err` propagates an unhandled fault outwards.
pub type Outcome = Result<(), Fault>;

/// A pipeline stage wrapping the remainder of the chain.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Returns the interceptor's name, used in logs.
    fn name(&self) -> &str;

    /// Returns the interceptor's priority (lower = outer, runs earlier).
    fn priority(&self) -> i32 {
        0
    }

    /// Handles a request.
    ///
    /// Call `next.run(ctx)` to invoke the rest of the chain. `next` is
    /// `Copy` and may be run again, which re-enters only the stages after
    /// this one.
    async fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> Outcome;
}

/// The terminal handler at the end of the chain (the host's router).
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Produces the response for the current path.
    async fn invoke(&self, ctx: &mut RequestContext) -> Outcome;
}

/// An [`Endpoint`] backed by a synchronous closure.
pub struct FnEndpoint<F> {
    handler: F,
}

/// Wraps a closure as an [`Endpoint`].
pub fn endpoint_fn<F>(handler: F) -> FnEndpoint<F>
where
    F: Fn(&mut RequestContext) -> Outcome + Send + Sync,
{
    FnEndpoint { handler }
}

#[async_trait]
impl<F> Endpoint for FnEndpoint<F>
where
    F: Fn(&mut RequestContext) -> Outcome + Send + Sync,
{
    async fn invoke(&self, ctx: &mut RequestContext) -> Outcome {
        (self.handler)(ctx)
    }
}

impl<F> fmt::Debug for FnEndpoint<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnEndpoint").finish_non_exhaustive()
    }
}

/// Continuation handed to an interceptor: the rest of the chain.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    interceptors: &'a [Arc<dyn Interceptor>],
    endpoint: &'a dyn Endpoint,
}

impl<'a> Next<'a> {
    /// Creates a continuation over `interceptors` followed by `endpoint`.
    #[must_use]
    pub fn new(interceptors: &'a [Arc<dyn Interceptor>], endpoint: &'a dyn Endpoint) -> Self {
        Self {
            interceptors,
            endpoint,
        }
    }

    /// Runs the remaining interceptors and then the endpoint.
    pub async fn run(self, ctx: &mut RequestContext) -> Outcome {
        match self.interceptors.split_first() {
            Some((head, rest)) => head.handle(ctx, Next::new(rest, self.endpoint)).await,
            None => self.endpoint.invoke(ctx).await,
        }
    }

    /// Returns the number of interceptors left before the endpoint.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.interceptors.len()
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.interceptors.iter().map(|i| i.name()).collect();
        f.debug_struct("Next").field("interceptors", &names).finish()
    }
}
