//! Audit record type.

use crate::context::RequestContext;
use crate::errors::Fault;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A write-once description of a fault, appended to the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// The fault message.
    pub message: String,
    /// Stack or error-chain text, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault_detail: Option<String>,
    /// The acting user, when it could be resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    /// The request the fault occurred on.
    pub request_id: Uuid,
    /// Path base, path and query string of the request.
    pub path: String,
    /// When the record was created.
    pub recorded_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Creates a record for a fault observed on `ctx`.
    #[must_use]
    pub fn from_fault(fault: &Fault, ctx: &RequestContext) -> Self {
        Self {
            message: fault.message().to_string(),
            fault_detail: fault.detail().map(String::from),
            actor_id: None,
            request_id: ctx.request_id(),
            path: ctx.display_path(),
            recorded_at: Utc::now(),
        }
    }

    /// Sets the acting user.
    #[must_use]
    pub fn with_actor_id(mut self, actor_id: Option<String>) -> Self {
        self.actor_id = actor_id;
        self
    }
}
