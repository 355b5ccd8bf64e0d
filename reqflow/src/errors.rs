//! Error types for the reqflow request pipeline.
//!
//! The central type is [`Fault`], the value carried on the error side of an
//! interceptor [`Outcome`](crate::interceptors::Outcome). The remaining types
//! describe failures of collaborators and of configuration loading.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// The main error type for reqflow setup operations.
#[derive(Debug, Error)]
pub enum ReqflowError {
    /// Configuration could not be loaded or is invalid.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The logging subsystem could not be initialised.
    #[error("Logging initialisation failed: {0}")]
    Logging(String),
}

/// Classification of a [`Fault`] by origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// An ordinary unhandled error from a downstream stage.
    Downstream,
    /// The host cancelled the request.
    Cancelled,
    /// The host's deadline for the request elapsed.
    TimedOut,
    /// A downstream stage panicked.
    Panicked,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Downstream => "downstream",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timed_out",
            Self::Panicked => "panicked",
        };
        f.write_str(s)
    }
}

/// An unhandled fault raised somewhere below an interceptor.
///
/// The message is fixed at construction and is never rewritten while the
/// fault travels outwards; interceptors that re-raise hand back the same
/// value they received.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct Fault {
    message: String,
    detail: Option<String>,
    kind: FaultKind,
    cause: Option<Arc<anyhow::Error>>,
}

impl Fault {
    /// Creates a downstream fault with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
            kind: FaultKind::Downstream,
            cause: None,
        }
    }

    /// Wraps an arbitrary error.
    ///
    /// The message is the error's display text; the detail is the debug
    /// rendering of the whole error chain.
    #[must_use]
    pub fn from_error(error: impl Into<anyhow::Error>) -> Self {
        let error = error.into();
        Self {
            message: error.to_string(),
            detail: Some(format!("{error:?}")),
            kind: FaultKind::Downstream,
            cause: Some(Arc::new(error)),
        }
    }

    /// Creates a fault for a request cancelled by the host.
    #[must_use]
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::new(reason).with_kind(FaultKind::Cancelled)
    }

    /// Creates a fault for a request whose deadline elapsed.
    #[must_use]
    pub fn timed_out(reason: impl Into<String>) -> Self {
        Self::new(reason).with_kind(FaultKind::TimedOut)
    }

    /// Converts a caught panic payload into a fault.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = panic_message(payload.as_ref());
        Self {
            detail: Some(format!("panic: {message}")),
            message,
            kind: FaultKind::Panicked,
            cause: None,
        }
    }

    /// Attaches detail text (stack, error chain, diagnostics).
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Overrides the fault kind.
    #[must_use]
    pub fn with_kind(mut self, kind: FaultKind) -> Self {
        self.kind = kind;
        self
    }

    /// Returns the fault message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the fault detail, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the fault kind.
    #[must_use]
    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    /// Returns the wrapped error, if the fault was built from one.
    #[must_use]
    pub fn inner_error(&self) -> Option<&anyhow::Error> {
        self.cause.as_deref()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Failure to persist an audit record.
///
/// Interceptors always swallow this error; it is logged and never reaches
/// the caller.
#[derive(Debug, Clone, Error)]
#[error("Audit write failed: {message}")]
pub struct AuditWriteError {
    /// Description of the failure.
    pub message: String,
}

impl AuditWriteError {
    /// Creates a new audit write error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure to resolve the acting user for an audit record.
#[derive(Debug, Clone, Error)]
#[error("Actor resolution failed: {message}")]
pub struct ActorResolutionError {
    /// Description of the failure.
    pub message: String,
}

impl ActorResolutionError {
    /// Creates a new actor resolution error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration document is not valid JSON for the schema.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A static resource pattern is not a valid regular expression.
    #[error("Invalid static resource pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The re-execution target path is not an absolute path.
    #[error("Re-execution target path must start with '/': {0:?}")]
    TargetPath(String),

    /// A re-execution status code is outside the error range.
    #[error("Re-execution status code must be in 400..=599, got {0}")]
    StatusCode(u16),

    /// The configured actor header is not a valid header name.
    #[error("Invalid actor header name: {0:?}")]
    HeaderName(String),

    /// Re-execution is enabled but no status code triggers it.
    #[error("Re-execution is enabled but no status codes are configured")]
    NoStatusCodes,
}
