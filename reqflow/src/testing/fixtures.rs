//! Test fixtures for building requests and pipelines.

use http::header::{HeaderName, HeaderValue, AUTHORIZATION};
use http::Method;
use std::sync::Arc;
use tracing::warn;

use crate::audit::{CollectingAuditLogger, StoreFlag};
use crate::caller::BEARER_SCHEME;
use crate::config::PipelineConfig;
use crate::context::RequestContext;
use crate::interceptors::Endpoint;
use crate::pipeline::{Collaborators, Pipeline, PipelineBuilder};

/// A request builder for tests.
#[derive(Debug, Clone)]
pub struct TestRequest {
    method: Method,
    target: String,
    path_base: String,
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl Default for TestRequest {
    fn default() -> Self {
        Self {
            method: Method::GET,
            target: "/".to_string(),
            path_base: String::new(),
            headers: Vec::new(),
        }
    }
}

impl TestRequest {
    /// Creates a `GET /` request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `GET` request for a target such as `/search?q=rust`.
    #[must_use]
    pub fn get(target: impl Into<String>) -> Self {
        Self::new().target(target)
    }

    /// Sets the request target (path plus optional query).
    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Sets the method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the path base.
    #[must_use]
    pub fn path_base(mut self, path_base: impl Into<String>) -> Self {
        self.path_base = path_base.into();
        self
    }

    /// Adds a bearer token, making the request an API call.
    #[must_use]
    pub fn bearer(self, token: &str) -> Self {
        self.header(AUTHORIZATION, &format!("{BEARER_SCHEME} {token}"))
    }

    /// Adds a header. Values that are not valid header text are skipped.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => self.headers.push((name, value)),
            Err(error) => warn!(header = %name, error = %error, "Skipping invalid test header"),
        }
        self
    }

    /// Builds the context.
    #[must_use]
    pub fn build(self) -> RequestContext {
        let mut ctx =
            RequestContext::from_target(self.method, &self.target).with_path_base(self.path_base);
        for (name, value) in self.headers {
            ctx.headers_mut().append(name, value);
        }
        ctx
    }
}

/// A pipeline assembled from the default configuration with in-memory
/// collaborators.
pub struct TestPipeline {
    /// The pipeline under test.
    pub pipeline: Pipeline,
    /// Records every audit write.
    pub audit_log: Arc<CollectingAuditLogger>,
    /// Controls whether the audit store reports itself as installed.
    pub store: Arc<StoreFlag>,
}

impl TestPipeline {
    /// Builds a pipeline in front of `endpoint` with an installed store.
    pub fn new(endpoint: Arc<dyn Endpoint>) -> Result<Self, crate::errors::ConfigError> {
        Self::with_config(&PipelineConfig::default(), endpoint)
    }

    /// Builds a pipeline from `config` in front of `endpoint`.
    pub fn with_config(
        config: &PipelineConfig,
        endpoint: Arc<dyn Endpoint>,
    ) -> Result<Self, crate::errors::ConfigError> {
        let audit_log = Arc::new(CollectingAuditLogger::new());
        let store = Arc::new(StoreFlag::new(true));
        let collaborators = Collaborators::new(audit_log.clone(), store.clone());
        let pipeline = PipelineBuilder::from_config(config, collaborators)?.build(endpoint);
        Ok(Self {
            pipeline,
            audit_log,
            store,
        })
    }
}

impl std::fmt::Debug for TestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestPipeline")
            .field("pipeline", &self.pipeline)
            .field("audit_entries", &self.audit_log.len())
            .finish_non_exhaustive()
    }
}
