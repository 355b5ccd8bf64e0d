//! Predicates the re-execution interceptor delegates to.

use crate::config::StaticResourceConfig;
use crate::context::ResponseState;
use crate::errors::ConfigError;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use regex::RegexSet;

/// Decides whether a path addresses a static asset.
///
/// Static assets keep their raw 404 instead of being rerouted to a page.
#[cfg_attr(test, mockall::automock)]
pub trait StaticResourcePredicate: Send + Sync {
    /// Returns true if `path` names a static resource.
    fn is_static_resource(&self, path: &str) -> bool;
}

/// Decides whether a response already carries content.
#[cfg_attr(test, mockall::automock)]
pub trait ResponseBodyProbe: Send + Sync {
    /// Returns true if the response has a body or was finalised.
    fn has_body(&self, response: &ResponseState) -> bool;
}

/// Regex-backed static resource predicate.
#[derive(Debug, Clone)]
pub struct StaticResourceMatcher {
    patterns: RegexSet,
}

impl StaticResourceMatcher {
    /// Compiles a matcher from patterns matched against the request path.
    pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            patterns: RegexSet::new(patterns)?,
        })
    }

    /// Compiles a matcher from configuration.
    pub fn from_config(config: &StaticResourceConfig) -> Result<Self, ConfigError> {
        Self::new(&config.patterns)
    }

    /// Returns the number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if no pattern is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl StaticResourcePredicate for StaticResourceMatcher {
    fn is_static_resource(&self, path: &str) -> bool {
        self.patterns.is_match(path)
    }
}

/// Body probe that inspects written bytes, completion and the content headers.
///
/// A response that already declares a `Content-Type` counts as having
/// content, even before any bytes are written.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBodyProbe;

impl ResponseBodyProbe for DefaultBodyProbe {
    fn has_body(&self, response: &ResponseState) -> bool {
        if response.is_completed() || !response.body().is_empty() {
            return true;
        }
        let has_content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .is_some_and(|v| !v.as_bytes().iter().all(u8::is_ascii_whitespace));
        if has_content_type {
            return true;
        }
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .is_some_and(|len| len > 0)
    }
}
