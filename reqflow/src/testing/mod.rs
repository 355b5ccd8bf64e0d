//! Testing utilities for reqflow pipelines.
//!
//! This module provides:
//! - Scripted and slow endpoints
//! - Audit and actor test doubles
//! - Request and pipeline fixtures
//! - Assertions on request state

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_body, assert_not_rerouted, assert_request_restored, assert_rerouted, assert_status,
};
pub use fixtures::{TestPipeline, TestRequest};
pub use mocks::{
    FailingAuditLogger, FixedActorResolver, RecordedCall, Route, ScriptedEndpoint, SlowEndpoint,
};
