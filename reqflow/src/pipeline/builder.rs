//! Pipeline builder and core stage registration.

use super::Pipeline;
use crate::audit::{
    ActorResolver, AnonymousActorResolver, AuditLogger, HeaderActorResolver, StoreStatus,
};
use crate::config::PipelineConfig;
use crate::errors::ConfigError;
use crate::interceptors::{
    Endpoint, ExceptionAuditInterceptor, Interceptor, StatusCodeReExecuteInterceptor,
};
use crate::resources::{
    DefaultBodyProbe, ResponseBodyProbe, StaticResourceMatcher, StaticResourcePredicate,
};
use std::sync::Arc;

/// External services the two core stages depend on.
///
/// Only the audit logger and store status are required. The actor resolver
/// falls back to the configured actor header (or anonymous), the static
/// resource predicate to the configured patterns, and the body probe to
/// [`DefaultBodyProbe`].
#[derive(Clone)]
pub struct Collaborators {
    audit_logger: Arc<dyn AuditLogger>,
    store_status: Arc<dyn StoreStatus>,
    actor_resolver: Option<Arc<dyn ActorResolver>>,
    static_resources: Option<Arc<dyn StaticResourcePredicate>>,
    body_probe: Option<Arc<dyn ResponseBodyProbe>>,
}

impl Collaborators {
    /// Creates collaborators with the required services.
    #[must_use]
    pub fn new(audit_logger: Arc<dyn AuditLogger>, store_status: Arc<dyn StoreStatus>) -> Self {
        Self {
            audit_logger,
            store_status,
            actor_resolver: None,
            static_resources: None,
            body_probe: None,
        }
    }

    /// Sets the actor resolver.
    #[must_use]
    pub fn with_actor_resolver(mut self, resolver: Arc<dyn ActorResolver>) -> Self {
        self.actor_resolver = Some(resolver);
        self
    }

    /// Sets the static resource predicate.
    #[must_use]
    pub fn with_static_resources(mut self, predicate: Arc<dyn StaticResourcePredicate>) -> Self {
        self.static_resources = Some(predicate);
        self
    }

    /// Sets the response body probe.
    #[must_use]
    pub fn with_body_probe(mut self, probe: Arc<dyn ResponseBodyProbe>) -> Self {
        self.body_probe = Some(probe);
        self
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("actor_resolver", &self.actor_resolver.is_some())
            .field("static_resources", &self.static_resources.is_some())
            .field("body_probe", &self.body_probe.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Pipeline`].
///
/// Interceptors are ordered by priority (lower = outer). Interceptors with
/// equal priority keep their registration order.
#[derive(Default)]
pub struct PipelineBuilder {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with the exception-audit and re-execution stages
    /// registered from `config`.
    pub fn from_config(
        config: &PipelineConfig,
        collaborators: Collaborators,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let actor_resolver: Arc<dyn ActorResolver> = match (
            collaborators.actor_resolver,
            config.audit.actor_header.as_deref(),
        ) {
            (Some(resolver), _) => resolver,
            (None, Some(header)) => Arc::new(HeaderActorResolver::from_name(header)?),
            (None, None) => Arc::new(AnonymousActorResolver),
        };

        let audit = ExceptionAuditInterceptor::new(
            collaborators.audit_logger,
            actor_resolver,
            collaborators.store_status,
        )
        .with_audit_enabled(config.audit.enabled);

        let mut builder = Self::new().with(Arc::new(audit));

        if config.reexecute.enabled {
            let static_resources = match collaborators.static_resources {
                Some(predicate) => predicate,
                None => Arc::new(StaticResourceMatcher::from_config(&config.static_resources)?),
            };
            let body_probe = collaborators
                .body_probe
                .unwrap_or_else(|| Arc::new(DefaultBodyProbe));
            let reexecute = StatusCodeReExecuteInterceptor::new(
                config.reexecute.target_path.clone(),
                static_resources,
                body_probe,
            )
            .with_status_codes(&config.reexecute.status_codes)?;
            builder = builder.with(Arc::new(reexecute));
        }

        Ok(builder)
    }

    /// Adds an interceptor.
    pub fn add(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
        self.interceptors.sort_by_key(|i| i.priority());
    }

    /// Adds an interceptor, builder style.
    #[must_use]
    pub fn with(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.add(interceptor);
        self
    }

    /// Returns the number of registered interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Finishes the pipeline with the terminal endpoint.
    #[must_use]
    pub fn build(self, endpoint: Arc<dyn Endpoint>) -> Pipeline {
        Pipeline::new(self.interceptors, endpoint)
    }
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.interceptors.iter().map(|i| i.name()).collect();
        f.debug_struct("PipelineBuilder").field("interceptors", &names).finish()
    }
}
