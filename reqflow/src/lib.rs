//! # Reqflow
//!
//! Core interceptors for a request-processing pipeline.
//!
//! Reqflow provides an ordered interceptor chain in front of a terminal
//! endpoint, plus two core stages:
//!
//! - **Exception audit**: API callers get the fault message as the response
//!   body; browser faults are written to an audit log and re-raised
//! - **Status-code re-execution**: bodiless 404s from browsers are rerouted
//!   to an internal page, with the original request description restored
//!   afterwards
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reqflow::prelude::*;
//! use std::sync::Arc;
//!
//! let config = PipelineConfig::from_file("reqflow.json")?;
//! init_logging(&config.logging)?;
//!
//! let collaborators = Collaborators::new(
//!     Arc::new(TracingAuditLogger),
//!     Arc::new(StoreFlag::new(true)),
//! );
//! let pipeline = PipelineBuilder::from_config(&config, collaborators)?
//!     .build(Arc::new(endpoint_fn(|ctx: &mut RequestContext| {
//!         ctx.response_mut().write("hello");
//!         Ok(())
//!     })));
//!
//! let mut ctx = RequestContext::from_target(http::Method::GET, "/unknown");
//! pipeline.execute(&mut ctx).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod audit;
pub mod caller;
pub mod config;
pub mod context;
pub mod errors;
pub mod interceptors;
pub mod observability;
pub mod pipeline;
pub mod resources;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::audit::{
        ActorResolver, AnonymousActorResolver, AuditLogger, AuditRecord, HeaderActorResolver,
        NoOpAuditLogger, StaticStoreStatus, StoreFlag, StoreStatus, TracingAuditLogger,
    };
    pub use crate::caller::{classify, CallerClass};
    pub use crate::config::{
        AuditConfig, LogFormat, LoggingConfig, PipelineConfig, ReExecuteConfig,
        StaticResourceConfig,
    };
    pub use crate::context::{ReExecutionFeature, RequestContext, ResponseState};
    pub use crate::errors::{ConfigError, Fault, FaultKind, ReqflowError};
    pub use crate::interceptors::{
        endpoint_fn, Endpoint, ExceptionAuditInterceptor, Interceptor, Next, Outcome,
        StatusCodeReExecuteInterceptor,
    };
    pub use crate::observability::init_logging;
    pub use crate::pipeline::{Collaborators, Pipeline, PipelineBuilder};
    pub use crate::resources::{
        DefaultBodyProbe, ResponseBodyProbe, StaticResourceMatcher, StaticResourcePredicate,
    };
}
