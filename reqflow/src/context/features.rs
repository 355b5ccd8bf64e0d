//! Typed features stored in the request's feature bag.

use http::StatusCode;

/// Describes the request as it was before a status-code re-execution.
///
/// Present in the feature bag only while a re-execution is running, so a
/// substituted page can inspect what was originally requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReExecutionFeature {
    /// Path base before the reroute.
    pub original_path_base: String,
    /// Path before the reroute.
    pub original_path: String,
    /// Query string (with leading `?`, or empty) before the reroute.
    pub original_query_string: String,
    /// Status code that triggered the reroute.
    pub original_status: StatusCode,
}

impl ReExecutionFeature {
    /// Creates a feature from the captured request description.
    #[must_use]
    pub fn new(
        original_path_base: impl Into<String>,
        original_path: impl Into<String>,
        original_query_string: impl Into<String>,
        original_status: StatusCode,
    ) -> Self {
        Self {
            original_path_base: original_path_base.into(),
            original_path: original_path.into(),
            original_query_string: original_query_string.into(),
            original_status,
        }
    }
}
