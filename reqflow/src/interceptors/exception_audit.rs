//! Exception classification and audit interceptor.
//!
//! Unhandled faults from downstream stages end here. Programmatic callers
//! get the fault message as the response body and the fault stops. Browser
//! callers get an audit record (when the store is installed) and the fault
//! is re-raised unchanged for the host's error-page renderer.

use super::{Interceptor, Next, Outcome};
use crate::audit::{ActorResolver, AuditLogger, AuditRecord, StoreStatus};
use crate::caller::{classify, CallerClass};
use crate::context::RequestContext;
use crate::errors::Fault;
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Interceptor that classifies unhandled faults and audits browser-facing ones.
pub struct ExceptionAuditInterceptor {
    logger: Arc<dyn AuditLogger>,
    actors: Arc<dyn ActorResolver>,
    store: Arc<dyn StoreStatus>,
    audit_enabled: bool,
}

impl ExceptionAuditInterceptor {
    /// Creates the interceptor from its collaborators.
    #[must_use]
    pub fn new(
        logger: Arc<dyn AuditLogger>,
        actors: Arc<dyn ActorResolver>,
        store: Arc<dyn StoreStatus>,
    ) -> Self {
        Self {
            logger,
            actors,
            store,
            audit_enabled: true,
        }
    }

    /// Enables or disables audit writes. Faults are re-raised either way.
    #[must_use]
    pub fn with_audit_enabled(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    /// Writes an audit record for `fault`. Never fails and never panics.
    async fn record(&self, ctx: &RequestContext, fault: &Fault) {
        if !self.audit_enabled {
            debug!(request_id = %ctx.request_id(), "Audit disabled, skipping record");
            return;
        }

        let installed = catch_unwind(AssertUnwindSafe(|| self.store.is_installed())).unwrap_or(false);
        if !installed {
            error!(
                request_id = %ctx.request_id(),
                path = %ctx.display_path(),
                fault_kind = %fault.kind(),
                "Unhandled fault before store installation: {}", fault
            );
            return;
        }

        let actor_id = match catch_unwind(AssertUnwindSafe(|| self.actors.current_actor_id(ctx))) {
            Ok(Ok(actor_id)) => actor_id,
            Ok(Err(e)) => {
                warn!(request_id = %ctx.request_id(), error = %e, "Recording fault without actor");
                None
            }
            Err(_) => {
                warn!(request_id = %ctx.request_id(), "Actor resolver panicked, recording fault without actor");
                None
            }
        };

        let record = AuditRecord::from_fault(fault, ctx).with_actor_id(actor_id);
        match AssertUnwindSafe(self.logger.write(&record)).catch_unwind().await {
            Ok(Ok(())) => debug!(request_id = %ctx.request_id(), "Audit record written"),
            Ok(Err(e)) => warn!(request_id = %ctx.request_id(), error = %e, "Audit record dropped"),
            Err(_) => warn!(request_id = %ctx.request_id(), "Audit logger panicked, record dropped"),
        }
    }
}

impl std::fmt::Debug for ExceptionAuditInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExceptionAuditInterceptor")
            .field("audit_enabled", &self.audit_enabled)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Interceptor for ExceptionAuditInterceptor {
    fn name(&self) -> &str {
        "exception_audit"
    }

    fn priority(&self) -> i32 {
        -100
    }

    async fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> Outcome {
        let fault = match AssertUnwindSafe(next.run(ctx)).catch_unwind().await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(fault)) => fault,
            Err(payload) => Fault::from_panic(payload),
        };

        match classify(ctx.headers()) {
            CallerClass::Api => {
                debug!(
                    request_id = %ctx.request_id(),
                    fault_kind = %fault.kind(),
                    "Returning fault message to API caller"
                );
                ctx.response_mut().write_terminal(fault.message());
                Ok(())
            }
            CallerClass::Browser => {
                self.record(ctx, &fault).await;
                Err(fault)
            }
        }
    }
}
