//! Status-code re-execution interceptor.
//!
//! When the rest of the chain finishes with a qualifying status code and no
//! body, the request is rerouted to an internal page by running the rest of
//! the chain again against a substituted path. The original path base, path
//! and query string are written back on every exit path.

use super::{Interceptor, Next, Outcome};
use crate::caller::{classify, CallerClass};
use crate::context::{ReExecutionFeature, RequestContext};
use crate::config::reexecutable_status;
use crate::errors::ConfigError;
use crate::resources::{ResponseBodyProbe, StaticResourcePredicate};
use async_trait::async_trait;
use http::StatusCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Scoped reroute of a request.
///
/// Entering captures the request description into a [`ReExecutionFeature`]
/// and rewrites the path. Dropping the guard restores the original values
/// and removes the feature, whether the reroute returned, faulted, panicked
/// or was cancelled by dropping its future.
pub struct ReExecutionGuard<'a> {
    ctx: &'a mut RequestContext,
    original: ReExecutionFeature,
}

impl<'a> ReExecutionGuard<'a> {
    /// Reroutes `ctx` to `target_path`, clearing the query string.
    pub fn enter(ctx: &'a mut RequestContext, target_path: &str, original_status: StatusCode) -> Self {
        let original = ReExecutionFeature::new(
            ctx.path_base(),
            ctx.path(),
            ctx.query_string(),
            original_status,
        );
        ctx.features_mut().insert(original.clone());
        ctx.set_path(target_path);
        ctx.set_query_string("");
        Self { ctx, original }
    }

    /// Returns the rerouted context.
    pub fn context(&mut self) -> &mut RequestContext {
        &mut *self.ctx
    }

    /// Returns the captured original request description.
    #[must_use]
    pub fn original(&self) -> &ReExecutionFeature {
        &self.original
    }
}

impl Drop for ReExecutionGuard<'_> {
    fn drop(&mut self) {
        self.ctx.set_path_base(self.original.original_path_base.clone());
        self.ctx.set_path(self.original.original_path.clone());
        self.ctx.set_query_string(&self.original.original_query_string);
        self.ctx.features_mut().remove::<ReExecutionFeature>();
    }
}

/// Interceptor that reroutes bodiless error responses to an internal page.
pub struct StatusCodeReExecuteInterceptor {
    status_codes: Vec<StatusCode>,
    target_path: String,
    static_resources: Arc<dyn StaticResourcePredicate>,
    body_probe: Arc<dyn ResponseBodyProbe>,
}

impl StatusCodeReExecuteInterceptor {
    /// Default reroute target.
    pub const DEFAULT_TARGET_PATH: &'static str = "/page-not-found";

    /// Creates an interceptor that reroutes 404s to `target_path`.
    #[must_use]
    pub fn new(
        target_path: impl Into<String>,
        static_resources: Arc<dyn StaticResourcePredicate>,
        body_probe: Arc<dyn ResponseBodyProbe>,
    ) -> Self {
        Self {
            status_codes: vec![StatusCode::NOT_FOUND],
            target_path: target_path.into(),
            static_resources,
            body_probe,
        }
    }

    /// Replaces the set of triggering status codes. Each must be in 400..=599.
    pub fn with_status_codes(mut self, codes: &[u16]) -> Result<Self, ConfigError> {
        self.status_codes = codes
            .iter()
            .map(|&code| reexecutable_status(code))
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    /// Returns the reroute target.
    #[must_use]
    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    fn should_reexecute(&self, ctx: &RequestContext) -> bool {
        let status = ctx.response().status();
        if !self.status_codes.contains(&status) {
            return false;
        }
        if ctx.re_execution().is_some() {
            debug!(request_id = %ctx.request_id(), "Already re-executing, leaving status as is");
            return false;
        }
        if self.body_probe.has_body(ctx.response()) {
            return false;
        }
        if classify(ctx.headers()) == CallerClass::Api {
            return false;
        }
        if self.static_resources.is_static_resource(ctx.path()) {
            debug!(request_id = %ctx.request_id(), path = %ctx.path(), "Static resource, not re-executing");
            return false;
        }
        true
    }
}

impl std::fmt::Debug for StatusCodeReExecuteInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusCodeReExecuteInterceptor")
            .field("status_codes", &self.status_codes)
            .field("target_path", &self.target_path)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Interceptor for StatusCodeReExecuteInterceptor {
    fn name(&self) -> &str {
        "status_code_reexecute"
    }

    fn priority(&self) -> i32 {
        -50
    }

    async fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> Outcome {
        next.run(ctx).await?;

        if !self.should_reexecute(ctx) {
            return Ok(());
        }

        let status = ctx.response().status();
        info!(
            request_id = %ctx.request_id(),
            path = %ctx.path(),
            status = status.as_u16(),
            target = %self.target_path,
            "Re-executing request"
        );

        let outcome = {
            let mut guard = ReExecutionGuard::enter(ctx, &self.target_path, status);
            next.run(guard.context()).await
        };

        match &outcome {
            Ok(()) => debug!(
                request_id = %ctx.request_id(),
                path = %ctx.path(),
                status = ctx.response().status().as_u16(),
                "Re-execution finished"
            ),
            Err(fault) => warn!(
                request_id = %ctx.request_id(),
                path = %ctx.path(),
                error = %fault,
                "Re-execution faulted"
            ),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Fault;
    use crate::interceptors::{endpoint_fn, Endpoint};
    use crate::resources::{DefaultBodyProbe, MockResponseBodyProbe, MockStaticResourcePredicate};
    use http::header::{HeaderValue, AUTHORIZATION};
    use http::Method;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    fn not_static() -> Arc<dyn StaticResourcePredicate> {
        let mut predicate = MockStaticResourcePredicate::new();
        predicate.expect_is_static_resource().return_const(false);
        Arc::new(predicate)
    }

    fn interceptor(static_resources: Arc<dyn StaticResourcePredicate>) -> Arc<dyn Interceptor> {
        Arc::new(StatusCodeReExecuteInterceptor::new(
            StatusCodeReExecuteInterceptor::DEFAULT_TARGET_PATH,
            static_resources,
            Arc::new(DefaultBodyProbe),
        ))
    }

    async fn run(interceptor: Arc<dyn Interceptor>, endpoint: &dyn Endpoint, ctx: &mut RequestContext) -> Outcome {
        let chain = [interceptor];
        Next::new(&chain, endpoint).run(ctx).await
    }

    /// Endpoint that 404s on everything except the not-found page, and
    /// records what it saw on each call.
    fn site(seen: Arc<Mutex<Vec<(String, String, bool)>>>) -> impl Endpoint {
        endpoint_fn(move |ctx: &mut RequestContext| {
            seen.lock().push((
                ctx.path().to_string(),
                ctx.query_string().to_string(),
                ctx.re_execution().is_some(),
            ));
            if ctx.path() == "/page-not-found" {
                ctx.response_mut().write("Sorry, not found");
            } else {
                ctx.response_mut().set_status(StatusCode::NOT_FOUND);
            }
            Ok(())
        })
    }

    #[tokio::test]
    async fn test_404_is_rerouted_and_restored() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut ctx = RequestContext::from_target(Method::GET, "/unknown?ref=home").with_path_base("/app");

        run(interceptor(not_static()), &site(seen.clone()), &mut ctx).await.unwrap();

        assert_eq!(
            *seen.lock(),
            vec![
                ("/unknown".to_string(), "?ref=home".to_string(), false),
                ("/page-not-found".to_string(), String::new(), true),
            ]
        );
        assert_eq!(ctx.path(), "/unknown");
        assert_eq!(ctx.path_base(), "/app");
        assert_eq!(ctx.query_string(), "?ref=home");
        assert!(ctx.re_execution().is_none());
        assert_eq!(ctx.response().status(), StatusCode::NOT_FOUND);
        assert_eq!(ctx.response().body_text(), "Sorry, not found");
    }

    #[tokio::test]
    async fn test_feature_describes_original_request() {
        let captured = Arc::new(Mutex::new(None));
        let sink = captured.clone();
        let endpoint = endpoint_fn(move |ctx: &mut RequestContext| {
            match ctx.re_execution() {
                Some(feature) => *sink.lock() = Some(feature.clone()),
                None => ctx.response_mut().set_status(StatusCode::NOT_FOUND),
            }
            Ok(())
        });
        let mut ctx = RequestContext::from_target(Method::GET, "/missing?a=1").with_path_base("/base");

        run(interceptor(not_static()), &endpoint, &mut ctx).await.unwrap();

        let feature = captured.lock().clone().unwrap();
        assert_eq!(
            feature,
            ReExecutionFeature::new("/base", "/missing", "?a=1", StatusCode::NOT_FOUND)
        );
    }

    #[tokio::test]
    async fn test_static_resource_keeps_404() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut predicate = MockStaticResourcePredicate::new();
        predicate
            .expect_is_static_resource()
            .withf(|path| path == "/style.css")
            .times(1)
            .return_const(true);
        let mut ctx = RequestContext::new(Method::GET, "/style.css");

        run(interceptor(Arc::new(predicate)), &site(seen.clone()), &mut ctx).await.unwrap();

        assert_eq!(seen.lock().len(), 1);
        assert_eq!(ctx.response().status(), StatusCode::NOT_FOUND);
        assert!(ctx.response().body().is_empty());
        assert_eq!(ctx.path(), "/style.css");
    }

    #[tokio::test]
    async fn test_api_caller_keeps_404() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut ctx = RequestContext::new(Method::GET, "/api/missing")
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));

        run(interceptor(not_static()), &site(seen.clone()), &mut ctx).await.unwrap();

        assert_eq!(seen.lock().len(), 1);
        assert_eq!(ctx.response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_404_with_body_is_left_alone() {
        let mut probe = MockResponseBodyProbe::new();
        probe.expect_has_body().return_const(true);
        let interceptor: Arc<dyn Interceptor> = Arc::new(StatusCodeReExecuteInterceptor::new(
            "/page-not-found",
            not_static(),
            Arc::new(probe),
        ));
        let calls = Arc::new(Mutex::new(0_usize));
        let counter = calls.clone();
        let endpoint = endpoint_fn(move |ctx: &mut RequestContext| {
            *counter.lock() += 1;
            ctx.response_mut().set_status(StatusCode::NOT_FOUND);
            Ok(())
        });
        let mut ctx = RequestContext::new(Method::GET, "/unknown");

        run(interceptor, &endpoint, &mut ctx).await.unwrap();

        assert_eq!(*calls.lock(), 1);
    }

    #[tokio::test]
    async fn test_other_status_codes_pass_through() {
        let calls = Arc::new(Mutex::new(0_usize));
        let counter = calls.clone();
        let endpoint = endpoint_fn(move |ctx: &mut RequestContext| {
            *counter.lock() += 1;
            ctx.response_mut().set_status(StatusCode::GONE);
            Ok(())
        });
        let mut ctx = RequestContext::new(Method::GET, "/old");

        run(interceptor(not_static()), &endpoint, &mut ctx).await.unwrap();
        assert_eq!(*calls.lock(), 1);
        assert_eq!(ctx.response().status(), StatusCode::GONE);
    }

    #[tokio::test]
    async fn test_configured_status_codes() {
        let interceptor: Arc<dyn Interceptor> = Arc::new(
            StatusCodeReExecuteInterceptor::new("/gone", not_static(), Arc::new(DefaultBodyProbe))
                .with_status_codes(&[404, 410])
                .unwrap(),
        );
        let endpoint = endpoint_fn(|ctx: &mut RequestContext| {
            if ctx.path() == "/gone" {
                ctx.response_mut().write("This page was removed");
            } else {
                ctx.response_mut().set_status(StatusCode::GONE);
            }
            Ok(())
        });
        let mut ctx = RequestContext::new(Method::GET, "/old");

        run(interceptor, &endpoint, &mut ctx).await.unwrap();
        assert_eq!(ctx.response().body_text(), "This page was removed");
        assert_eq!(ctx.path(), "/old");
    }

    #[test]
    fn test_invalid_status_code_rejected() {
        let result = StatusCodeReExecuteInterceptor::new("/x", not_static(), Arc::new(DefaultBodyProbe))
            .with_status_codes(&[1000]);
        assert!(matches!(result, Err(ConfigError::StatusCode(1000))));
    }

    #[test]
    fn test_non_error_status_code_rejected() {
        let build = |codes: &[u16]| {
            StatusCodeReExecuteInterceptor::new("/x", not_static(), Arc::new(DefaultBodyProbe))
                .with_status_codes(codes)
        };
        assert!(matches!(build(&[200]), Err(ConfigError::StatusCode(200))));
        assert!(matches!(build(&[404, 302]), Err(ConfigError::StatusCode(302))));
        assert!(matches!(build(&[600]), Err(ConfigError::StatusCode(600))));
        assert!(build(&[400, 599]).is_ok());
    }

    #[tokio::test]
    async fn test_downstream_fault_skips_reexecution() {
        let calls = Arc::new(Mutex::new(0_usize));
        let counter = calls.clone();
        let endpoint = endpoint_fn(move |ctx: &mut RequestContext| {
            *counter.lock() += 1;
            ctx.response_mut().set_status(StatusCode::NOT_FOUND);
            Err(Fault::new("DB timeout"))
        });
        let mut ctx = RequestContext::new(Method::GET, "/unknown");

        let fault = run(interceptor(not_static()), &endpoint, &mut ctx).await.unwrap_err();

        assert_eq!(fault.message(), "DB timeout");
        assert_eq!(*calls.lock(), 1);
    }

    #[tokio::test]
    async fn test_fault_during_reexecution_restores_then_reraises() {
        let endpoint = endpoint_fn(|ctx: &mut RequestContext| {
            if ctx.re_execution().is_some() {
                return Err(Fault::new("template missing"));
            }
            ctx.response_mut().set_status(StatusCode::NOT_FOUND);
            Ok(())
        });
        let mut ctx = RequestContext::from_target(Method::GET, "/unknown?x=1");

        let fault = run(interceptor(not_static()), &endpoint, &mut ctx).await.unwrap_err();

        assert_eq!(fault.message(), "template missing");
        assert_eq!(ctx.path(), "/unknown");
        assert_eq!(ctx.query_string(), "?x=1");
        assert!(ctx.re_execution().is_none());
    }

    #[tokio::test]
    async fn test_second_404_does_not_loop() {
        let calls = Arc::new(Mutex::new(0_usize));
        let counter = calls.clone();
        let endpoint = endpoint_fn(move |ctx: &mut RequestContext| {
            *counter.lock() += 1;
            ctx.response_mut().set_status(StatusCode::NOT_FOUND);
            Ok(())
        });
        let mut ctx = RequestContext::new(Method::GET, "/unknown");

        run(interceptor(not_static()), &endpoint, &mut ctx).await.unwrap();

        assert_eq!(*calls.lock(), 2);
        assert_eq!(ctx.path(), "/unknown");
        assert_eq!(ctx.response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_nested_interceptor_does_not_reenter_active_reroute() {
        let calls = Arc::new(Mutex::new(0_usize));
        let counter = calls.clone();
        let endpoint = endpoint_fn(move |ctx: &mut RequestContext| {
            *counter.lock() += 1;
            ctx.response_mut().set_status(StatusCode::NOT_FOUND);
            Ok(())
        });
        let chain = [interceptor(not_static()), interceptor(not_static())];
        let mut ctx = RequestContext::new(Method::GET, "/unknown");

        Next::new(&chain, &endpoint).run(&mut ctx).await.unwrap();

        // Outer reroute runs the inner stage again, which sees the active feature.
        assert_eq!(*calls.lock(), 3);
        assert_eq!(ctx.path(), "/unknown");
        assert!(ctx.re_execution().is_none());
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let mut ctx = RequestContext::from_target(Method::GET, "/unknown?q=1").with_path_base("/app");
        {
            let mut guard = ReExecutionGuard::enter(&mut ctx, "/page-not-found", StatusCode::NOT_FOUND);
            assert_eq!(guard.original().original_path, "/unknown");
            let rerouted = guard.context();
            assert_eq!(rerouted.path(), "/page-not-found");
            assert_eq!(rerouted.query_string(), "");
            assert_eq!(rerouted.path_base(), "/app");
            assert!(rerouted.re_execution().is_some());
            rerouted.set_path_base("/changed");
        }
        assert_eq!(ctx.path(), "/unknown");
        assert_eq!(ctx.query_string(), "?q=1");
        assert_eq!(ctx.path_base(), "/app");
        assert!(ctx.re_execution().is_none());
    }

    #[test]
    fn test_guard_restores_during_unwind() {
        let mut ctx = RequestContext::new(Method::GET, "/unknown");
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ReExecutionGuard::enter(&mut ctx, "/page-not-found", StatusCode::NOT_FOUND);
            panic!("renderer crashed");
        }));
        assert!(result.is_err());
        assert_eq!(ctx.path(), "/unknown");
        assert!(ctx.re_execution().is_none());
    }
}
