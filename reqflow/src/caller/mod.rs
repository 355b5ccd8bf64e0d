//! Caller classification.
//!
//! Requests carrying a bearer token come from programmatic clients and get
//! terse machine-readable errors; everything else is treated as a browser
//! and gets rendered error pages.

use http::header::{HeaderMap, AUTHORIZATION};
use std::fmt;

/// The authorization scheme that marks a programmatic caller.
pub const BEARER_SCHEME: &str = "Bearer";

/// The kind of client that sent a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallerClass {
    /// A programmatic client authenticating with a bearer token.
    Api,
    /// A human-facing client such as a web browser.
    Browser,
}

impl CallerClass {
    /// Returns true for programmatic callers.
    #[must_use]
    pub fn is_api(self) -> bool {
        matches!(self, Self::Api)
    }
}

impl fmt::Display for CallerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => f.write_str("api"),
            Self::Browser => f.write_str("browser"),
        }
    }
}

/// Classifies a request by its first `Authorization` header value.
///
/// The text before the first space must equal `Bearer` exactly
/// (case-sensitive). Only a single space separates the scheme, so leading
/// whitespace or a tab after the scheme does not match. A missing, empty or
/// non-ASCII header yields [`CallerClass::Browser`].
#[must_use]
pub fn classify(headers: &HeaderMap) -> CallerClass {
    let scheme = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(' ').next());

    match scheme {
        Some(BEARER_SCHEME) => CallerClass::Api,
        _ => CallerClass::Browser,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::HeaderValue;

    fn with_auth(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_is_api() {
        assert_eq!(classify(&with_auth("Bearer abc")), CallerClass::Api);
        assert_eq!(classify(&with_auth("Bearer x")), CallerClass::Api);
    }

    #[test]
    fn test_bare_bearer_token_is_api() {
        assert_eq!(classify(&with_auth("Bearer")), CallerClass::Api);
    }

    #[test]
    fn test_leading_whitespace_is_browser() {
        assert_eq!(classify(&with_auth("  Bearer abc")), CallerClass::Browser);
    }

    #[test]
    fn test_tab_separated_scheme_is_browser() {
        assert_eq!(classify(&with_auth("Bearer\tabc")), CallerClass::Browser);
    }

    #[test]
    fn test_extra_spaces_after_scheme_still_api() {
        assert_eq!(classify(&with_auth("Bearer  abc")), CallerClass::Api);
    }

    #[test]
    fn test_missing_header_is_browser() {
        assert_eq!(classify(&HeaderMap::new()), CallerClass::Browser);
    }

    #[test]
    fn test_empty_header_is_browser() {
        assert_eq!(classify(&with_auth("")), CallerClass::Browser);
        assert_eq!(classify(&with_auth("   ")), CallerClass::Browser);
    }

    #[test]
    fn test_scheme_is_case_sensitive() {
        assert_eq!(classify(&with_auth("bearer abc")), CallerClass::Browser);
        assert_eq!(classify(&with_auth("BEARER abc")), CallerClass::Browser);
    }

    #[test]
    fn test_other_schemes_are_browser() {
        assert_eq!(classify(&with_auth("Basic dXNlcjpwdw==")), CallerClass::Browser);
        assert_eq!(classify(&with_auth("BearerToken abc")), CallerClass::Browser);
    }

    #[test]
    fn test_only_first_value_counts() {
        let mut headers = with_auth("Basic abc");
        headers.append(AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(classify(&headers), CallerClass::Browser);
    }

    #[test]
    fn test_non_ascii_value_is_browser() {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_bytes(b"Bearer \xff").unwrap();
        headers.insert(AUTHORIZATION, value);
        assert_eq!(classify(&headers), CallerClass::Browser);
    }

    #[test]
    fn test_display() {
        assert_eq!(CallerClass::Api.to_string(), "api");
        assert_eq!(CallerClass::Browser.to_string(), "browser");
        assert!(CallerClass::Api.is_api());
        assert!(!CallerClass::Browser.is_api());
    }
}
