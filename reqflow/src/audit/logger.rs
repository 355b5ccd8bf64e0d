//! Audit logger trait and implementations.

use super::AuditRecord;
use crate::errors::AuditWriteError;
use async_trait::async_trait;
use parking_lot::RwLock;

/// Durable sink for audit records.
///
/// Callers inside the pipeline always swallow the returned error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLogger: Send + Sync {
    /// Appends a record to the audit log.
    async fn write(&self, record: &AuditRecord) -> Result<(), AuditWriteError>;
}

/// An audit logger that discards all records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpAuditLogger;

#[async_trait]
impl AuditLogger for NoOpAuditLogger {
    async fn write(&self, _record: &AuditRecord) -> Result<(), AuditWriteError> {
        Ok(())
    }
}

/// An audit logger that emits each record as a structured tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLogger;

#[async_trait]
impl AuditLogger for TracingAuditLogger {
    async fn write(&self, record: &AuditRecord) -> Result<(), AuditWriteError> {
        tracing::error!(
            target: "reqflow::audit",
            request_id = %record.request_id,
            path = %record.path,
            actor_id = record.actor_id.as_deref().unwrap_or("-"),
            fault_detail = record.fault_detail.as_deref().unwrap_or(""),
            recorded_at = %record.recorded_at.to_rfc3339(),
            "{}", record.message
        );
        Ok(())
    }
}

/// An audit logger that keeps records in memory.
#[derive(Debug, Default)]
pub struct CollectingAuditLogger {
    records: RwLock<Vec<AuditRecord>>,
}

impl CollectingAuditLogger {
    /// Creates a new collecting logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected records.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.read().clone()
    }

    /// Returns the number of collected records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Clears all collected records.
    pub fn clear(&self) {
        self.records.write().clear();
    }
}

#[async_trait]
impl AuditLogger for CollectingAuditLogger {
    async fn write(&self, record: &AuditRecord) -> Result<(), AuditWriteError> {
        self.records.write().push(record.clone());
        Ok(())
    }
}
