//! Actor resolution and persistent-store status.

use crate::context::RequestContext;
use crate::errors::{ActorResolutionError, ConfigError};
use http::header::HeaderName;
use std::sync::atomic::{AtomicBool, Ordering};

/// Resolves the user on whose behalf a request runs.
#[cfg_attr(test, mockall::automock)]
pub trait ActorResolver: Send + Sync {
    /// Returns the current actor's ID, or `None` for anonymous requests.
    fn current_actor_id(&self, ctx: &RequestContext)
        -> Result<Option<String>, ActorResolutionError>;
}

/// Resolver for deployments without user identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousActorResolver;

impl ActorResolver for AnonymousActorResolver {
    fn current_actor_id(
        &self,
        _ctx: &RequestContext,
    ) -> Result<Option<String>, ActorResolutionError> {
        Ok(None)
    }
}

/// Resolver that reads the actor ID from a trusted request header.
///
/// Intended for hosts where an upstream authentication layer sets the
/// header after verifying the caller.
#[derive(Debug, Clone)]
pub struct HeaderActorResolver {
    header: HeaderName,
}

impl HeaderActorResolver {
    /// Creates a resolver for `header`.
    #[must_use]
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }

    /// Creates a resolver from a header name string.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        HeaderName::try_from(name)
            .map(Self::new)
            .map_err(|_| ConfigError::HeaderName(name.to_string()))
    }
}

impl ActorResolver for HeaderActorResolver {
    fn current_actor_id(
        &self,
        ctx: &RequestContext,
    ) -> Result<Option<String>, ActorResolutionError> {
        let Some(value) = ctx.headers().get(&self.header) else {
            return Ok(None);
        };
        let value = value.to_str().map_err(|_| {
            ActorResolutionError::new(format!("header {} is not visible ASCII", self.header))
        })?;
        let value = value.trim();
        Ok((!value.is_empty()).then(|| value.to_string()))
    }
}

/// Reports whether the persistent store behind the audit log is installed.
#[cfg_attr(test, mockall::automock)]
pub trait StoreStatus: Send + Sync {
    /// Returns true once the store is installed and reachable.
    fn is_installed(&self) -> bool;
}

/// A store status flag the host flips once installation completes.
#[derive(Debug, Default)]
pub struct StoreFlag {
    installed: AtomicBool,
}

impl StoreFlag {
    /// Creates a flag with an initial state.
    #[must_use]
    pub fn new(installed: bool) -> Self {
        Self {
            installed: AtomicBool::new(installed),
        }
    }

    /// Updates the installed state.
    pub fn set_installed(&self, installed: bool) {
        self.installed.store(installed, Ordering::SeqCst);
    }
}

impl StoreStatus for StoreFlag {
    fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }
}

/// A store status fixed at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticStoreStatus(pub bool);

impl StoreStatus for StaticStoreStatus {
    fn is_installed(&self) -> bool {
        self.0
    }
}
