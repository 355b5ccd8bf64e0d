//! Audit logging collaborators.
//!
//! The exception-audit interceptor records browser-facing faults through an
//! [`AuditLogger`], attributing them to the actor returned by an
//! [`ActorResolver`] when the store reported by [`StoreStatus`] is installed.

mod actor;
mod logger;
mod record;

pub use actor::{
    ActorResolver, AnonymousActorResolver, HeaderActorResolver, StaticStoreStatus, StoreFlag,
    StoreStatus,
};
pub use logger::{AuditLogger, CollectingAuditLogger, NoOpAuditLogger, TracingAuditLogger};
pub use record::AuditRecord;

#[cfg(test)]
pub(crate) use actor::{MockActorResolver, MockStoreStatus};
#[cfg(test)]
pub(crate) use logger::MockAuditLogger;
