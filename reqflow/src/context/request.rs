//! The mutable per-request view handed to every interceptor.

use super::{ReExecutionFeature, ResponseState};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Extensions, Method};
use uuid::Uuid;

/// Per-request state shared by the interceptors of one pipeline run.
///
/// A context is owned by exactly one request execution. It is mutated in
/// place (re-execution rewrites the path and restores it afterwards) and is
/// intentionally not `Clone`.
#[derive(Debug)]
pub struct RequestContext {
    request_id: Uuid,
    method: Method,
    path_base: String,
    path: String,
    query_string: String,
    headers: HeaderMap,
    features: Extensions,
    response: ResponseState,
}

impl RequestContext {
    /// Creates a context for `method` and `path` with no query string.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            method,
            path_base: String::new(),
            path: path.into(),
            query_string: String::new(),
            headers: HeaderMap::new(),
            features: Extensions::new(),
            response: ResponseState::new(),
        }
    }

    /// Creates a context from a request target such as `/search?q=rust`.
    #[must_use]
    pub fn from_target(method: Method, target: &str) -> Self {
        match target.split_once('?') {
            Some((path, query)) => Self::new(method, path).with_query_string(query),
            None => Self::new(method, target),
        }
    }

    /// Sets the path base (the prefix the application is mounted under).
    #[must_use]
    pub fn with_path_base(mut self, path_base: impl Into<String>) -> Self {
        self.path_base = path_base.into();
        self
    }

    /// Sets the query string.
    #[must_use]
    pub fn with_query_string(mut self, query: &str) -> Self {
        self.set_query_string(query);
        self
    }

    /// Appends a header value.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Uses a caller-supplied request ID instead of a generated one.
    #[must_use]
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path base.
    #[must_use]
    pub fn path_base(&self) -> &str {
        &self.path_base
    }

    /// Replaces the path base.
    pub fn set_path_base(&mut self, path_base: impl Into<String>) {
        self.path_base = path_base.into();
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Replaces the request path.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Returns the query string including its leading `?`, or `""` when absent.
    #[must_use]
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Replaces the query string. An empty value clears it.
    pub fn set_query_string(&mut self, query: &str) {
        self.query_string = if query.is_empty() || query == "?" {
            String::new()
        } else if query.starts_with('?') {
            query.to_string()
        } else {
            format!("?{query}")
        };
    }

    /// Returns `path_base + path + query_string`.
    #[must_use]
    pub fn display_path(&self) -> String {
        format!("{}{}{}", self.path_base, self.path, self.query_string)
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request headers mutably.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the typed feature bag.
    #[must_use]
    pub fn features(&self) -> &Extensions {
        &self.features
    }

    /// Returns the typed feature bag mutably.
    pub fn features_mut(&mut self) -> &mut Extensions {
        &mut self.features
    }

    /// Returns the active re-execution feature, if a reroute is in progress.
    #[must_use]
    pub fn re_execution(&self) -> Option<&ReExecutionFeature> {
        self.features.get::<ReExecutionFeature>()
    }

    /// Returns the response under construction.
    #[must_use]
    pub fn response(&self) -> &ResponseState {
        &self.response
    }

    /// Returns the response under construction mutably.
    pub fn response_mut(&mut self) -> &mut ResponseState {
        &mut self.response
    }
}
