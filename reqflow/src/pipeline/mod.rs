//! Pipeline building and execution.
//!
//! This module provides:
//! - Collaborator wiring for the core stages
//! - A priority-ordered pipeline builder
//! - The request executor

mod builder;
mod executor;

pub use builder::{Collaborators, PipelineBuilder};
pub use executor::Pipeline;
