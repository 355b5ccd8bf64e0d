//! Pipeline execution.

use crate::context::RequestContext;
use crate::interceptors::{Endpoint, Interceptor, Next, Outcome};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info_span, Instrument};

/// An ordered interceptor chain in front of an endpoint.
///
/// A pipeline holds no per-request state and can serve any number of
/// requests concurrently.
pub struct Pipeline {
    interceptors: Vec<Arc<dyn Interceptor>>,
    endpoint: Arc<dyn Endpoint>,
}

impl Pipeline {
    pub(crate) fn new(interceptors: Vec<Arc<dyn Interceptor>>, endpoint: Arc<dyn Endpoint>) -> Self {
        Self {
            interceptors,
            endpoint,
        }
    }

    /// Returns a continuation positioned at the chain's entry point.
    #[must_use]
    pub fn entry(&self) -> Next<'_> {
        Next::new(&self.interceptors, self.endpoint.as_ref())
    }

    /// Runs one request through the whole chain.
    pub async fn execute(&self, ctx: &mut RequestContext) -> Outcome {
        let span = info_span!(
            "request",
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path()
        );
        let started = Instant::now();
        let outcome = self.entry().run(ctx).instrument(span.clone()).await;

        span.in_scope(|| {
            debug!(
                status = ctx.response().status().as_u16(),
                faulted = outcome.is_err(),
                duration_ms = started.elapsed().as_secs_f64() * 1000.0,
                "Request finished"
            );
        });
        outcome
    }

    /// Returns the interceptor names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    /// Returns the number of interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns true if no interceptor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}
