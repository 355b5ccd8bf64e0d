//! Test doubles for endpoints and collaborators.

use async_trait::async_trait;
use http::StatusCode;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

use crate::audit::{ActorResolver, AuditLogger, AuditRecord};
use crate::context::RequestContext;
use crate::errors::{ActorResolutionError, AuditWriteError, Fault};
use crate::interceptors::{Endpoint, Outcome};

/// What a [`ScriptedEndpoint`] does for a path.
#[derive(Debug, Clone)]
pub enum Route {
    /// Respond with a status code and body.
    Respond(StatusCode, String),
    /// Set a status code and write nothing.
    Status(StatusCode),
    /// Raise a fault with this message.
    Fail(String),
}

/// One call observed by a [`ScriptedEndpoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Path base at the time of the call.
    pub path_base: String,
    /// Path at the time of the call.
    pub path: String,
    /// Query string at the time of the call.
    pub query_string: String,
    /// Whether a re-execution was active.
    pub re_executing: bool,
}

/// An endpoint that routes by exact path and records every call.
///
/// Unknown paths produce a bodiless 404, like a router with no match.
#[derive(Debug, Default)]
pub struct ScriptedEndpoint {
    routes: HashMap<String, Route>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedEndpoint {
    /// Creates an endpoint with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route.
    #[must_use]
    pub fn route(mut self, path: impl Into<String>, route: Route) -> Self {
        self.routes.insert(path.into(), route);
        self
    }

    /// Adds a `200 OK` route with a body.
    #[must_use]
    pub fn page(self, path: impl Into<String>, body: impl Into<String>) -> Self {
        self.route(path, Route::Respond(StatusCode::OK, body.into()))
    }

    /// Adds a route that raises a fault.
    #[must_use]
    pub fn failing(self, path: impl Into<String>, message: impl Into<String>) -> Self {
        self.route(path, Route::Fail(message.into()))
    }

    /// Returns all recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Clears recorded calls.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }

    fn respond(&self, ctx: &mut RequestContext) -> Outcome {
        self.calls.lock().push(RecordedCall {
            path_base: ctx.path_base().to_string(),
            path: ctx.path().to_string(),
            query_string: ctx.query_string().to_string(),
            re_executing: ctx.re_execution().is_some(),
        });

        match self.routes.get(ctx.path()) {
            Some(Route::Respond(status, body)) => {
                // A substituted page keeps the status that triggered it.
                if ctx.re_execution().is_none() {
                    ctx.response_mut().set_status(*status);
                }
                ctx.response_mut().write(body);
                Ok(())
            }
            Some(Route::Status(status)) => {
                ctx.response_mut().set_status(*status);
                Ok(())
            }
            Some(Route::Fail(message)) => Err(Fault::new(message.clone())),
            None => {
                ctx.response_mut().set_status(StatusCode::NOT_FOUND);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Endpoint for ScriptedEndpoint {
    async fn invoke(&self, ctx: &mut RequestContext) -> Outcome {
        self.respond(ctx)
    }
}

/// An endpoint that sleeps before delegating to an inner endpoint.
pub struct SlowEndpoint<E> {
    inner: E,
    delay: Duration,
    only_when_re_executing: bool,
}

impl<E: Endpoint> SlowEndpoint<E> {
    /// Delays every call by `delay`.
    #[must_use]
    pub fn new(inner: E, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            only_when_re_executing: false,
        }
    }

    /// Delays only calls made during a re-execution.
    #[must_use]
    pub fn during_re_execution(inner: E, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            only_when_re_executing: true,
        }
    }

    /// Returns the wrapped endpoint.
    #[must_use]
    pub fn inner(&self) -> &E {
        &self.inner
    }
}

#[async_trait]
impl<E: Endpoint> Endpoint for SlowEndpoint<E> {
    async fn invoke(&self, ctx: &mut RequestContext) -> Outcome {
        if !self.only_when_re_executing || ctx.re_execution().is_some() {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.invoke(ctx).await
    }
}

/// An audit logger that counts attempts and always fails.
#[derive(Debug, Default)]
pub struct FailingAuditLogger {
    attempts: Mutex<Vec<AuditRecord>>,
}

impl FailingAuditLogger {
    /// Creates a new failing logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the records that were attempted.
    #[must_use]
    pub fn attempts(&self) -> Vec<AuditRecord> {
        self.attempts.lock().clone()
    }
}

#[async_trait]
impl AuditLogger for FailingAuditLogger {
    async fn write(&self, record: &AuditRecord) -> Result<(), AuditWriteError> {
        self.attempts.lock().push(record.clone());
        Err(AuditWriteError::new("store unreachable"))
    }
}

/// An actor resolver returning a fixed answer.
#[derive(Debug, Clone)]
pub struct FixedActorResolver {
    actor_id: Option<String>,
    fail: bool,
}

impl FixedActorResolver {
    /// Always resolves to `actor_id`.
    #[must_use]
    pub fn new(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: Some(actor_id.into()),
            fail: false,
        }
    }

    /// Always fails to resolve.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            actor_id: None,
            fail: true,
        }
    }
}

impl ActorResolver for FixedActorResolver {
    fn current_actor_id(
        &self,
        _ctx: &RequestContext,
    ) -> Result<Option<String>, ActorResolutionError> {
        if self.fail {
            Err(ActorResolutionError::new("identity provider unavailable"))
        } else {
            Ok(self.actor_id.clone())
        }
    }
}
