//! Test assertions for request contexts.

use http::StatusCode;

use crate::context::RequestContext;
use crate::testing::RecordedCall;

/// Asserts the response status.
pub fn assert_status(ctx: &RequestContext, expected: StatusCode) {
    assert_eq!(
        ctx.response().status(),
        expected,
        "Expected status {expected}, got {}",
        ctx.response().status()
    );
}

/// Asserts the response body as text.
pub fn assert_body(ctx: &RequestContext, expected: &str) {
    let actual = ctx.response().body_text();
    assert_eq!(actual, expected, "Expected body {expected:?}, got {actual:?}");
}

/// Asserts that the request description matches what the caller sent and
/// that no re-execution is active.
pub fn assert_request_restored(ctx: &RequestContext, path_base: &str, path: &str, query: &str) {
    assert_eq!(ctx.path_base(), path_base, "path base not restored");
    assert_eq!(ctx.path(), path, "path not restored");
    assert_eq!(ctx.query_string(), query, "query string not restored");
    assert!(
        ctx.re_execution().is_none(),
        "re-execution feature still present: {:?}",
        ctx.re_execution()
    );
}

/// Asserts that the endpoint saw the original path and then a reroute to
/// `target`.
pub fn assert_rerouted(calls: &[RecordedCall], original: &str, target: &str) {
    let paths: Vec<(&str, bool)> = calls
        .iter()
        .map(|call| (call.path.as_str(), call.re_executing))
        .collect();
    assert_eq!(
        paths,
        vec![(original, false), (target, true)],
        "Expected a single reroute from {original} to {target}"
    );
}

/// Asserts that the endpoint was called exactly once, without a reroute.
pub fn assert_not_rerouted(calls: &[RecordedCall]) {
    assert_eq!(
        calls.len(),
        1,
        "Expected a single endpoint call, got {calls:?}"
    );
    assert!(!calls[0].re_executing, "Unexpected reroute: {calls:?}");
}
