//! A single `(method, pattern, handler chain)` entry.

use crate::error::RipcoreError;
use crate::req::Request;
use crate::res::Response;
use crate::transport::RawResponse;
use crate::types::{FlowCode, Handler, HttpMethod};
use crate::uri::path::match_path;

/// One registered route: a method, a path expression, and a non-empty ordered chain of
/// handlers.
pub struct Route<T: RawResponse> {
    method: HttpMethod,
    pattern: String,
    handlers: Vec<Handler<T>>,
}

impl<T: RawResponse> Route<T> {
    /// Constructs a route. Fails with [`RipcoreError::InvalidArgument`] if `handlers`
    /// is empty.
    pub fn new(
        method: HttpMethod,
        pattern: impl Into<String>,
        handlers: Vec<Handler<T>>,
    ) -> Result<Self, RipcoreError> {
        if handlers.is_empty() {
            return Err(RipcoreError::invalid_argument(
                "route must have at least one handler",
            ));
        }
        Ok(Self { method, pattern: pattern.into(), handlers })
    }

    /// The path expression this route was registered with.
    pub fn path(&self) -> &str {
        &self.pattern
    }

    /// The method this route was registered with.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Runs the path-pattern matcher against `request.path()` and, on a pattern match,
    /// stores the captured params onto the request regardless of whether the method
    /// also matches.
    ///
    /// Returns `true` iff both the method and the pattern matched.
    pub fn matches(&self, request: &Request) -> bool {
        let Some(captures) = match_path(&self.pattern, request.path()) else {
            return false;
        };
        request.set_path_params(captures);
        request.method() == self.method
    }

    /// Runs the handler chain in order. Each handler returns a [`FlowCode`]; `CONTINUE`
    /// advances to the next handler, `EXIT`/`ERROR` stop the chain. If the chain runs
    /// to completion without an explicit `EXIT`/`ERROR`, the route reports `EXIT`.
    pub fn handle(&self, request: &Request, response: &Response<T>) -> Result<FlowCode, crate::error::HttpError> {
        for handler in &self.handlers {
            match handler(request, response)? {
                FlowCode::Continue => continue,
                FlowCode::Exit => return Ok(FlowCode::Exit),
                FlowCode::Error => return Ok(FlowCode::Error),
            }
        }
        Ok(FlowCode::Exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HandlerResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeRaw;
    impl RawResponse for FakeRaw {
        fn send(&mut self, _: u16, _: &str, _: &[(String, String)], _: &[u8]) -> std::io::Result<()> {
            Ok(())
        }
        fn end(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn continue_handler() -> Handler<FakeRaw> {
        Arc::new(|_req, _res| -> HandlerResult { Ok(FlowCode::Continue) })
    }

    #[test]
    fn empty_handler_chain_is_rejected() {
        let err = Route::<FakeRaw>::new(HttpMethod::Get, "/x", vec![]).unwrap_err();
        assert_eq!(err.kind(), &crate::error::RipcoreErrorKind::InvalidArgument);
    }

    #[test]
    fn match_sets_params_even_on_method_mismatch() {
        let route = Route::<FakeRaw>::new(HttpMethod::Post, "/stress/:id", vec![continue_handler()]).unwrap();

        struct FakeRawReq {
            method: String,
            target: String,
        }
        impl crate::transport::RawRequest for FakeRawReq {
            fn method(&self) -> &str {
                &self.method
            }
            fn target(&self) -> &str {
                &self.target
            }
            fn version(&self) -> &str {
                "HTTP/1.1"
            }
            fn headers(&self) -> &[(String, String)] {
                &[]
            }
            fn into_body(self: Box<Self>) -> Vec<u8> {
                Vec::new()
            }
        }
        let request = Request::from_raw(Box::new(FakeRawReq {
            method: "GET".to_string(),
            target: "/stress/42".to_string(),
        }))
        .unwrap();

        assert!(!route.matches(&request));
        assert_eq!(request.param("id"), Some("42".to_string()));
    }

    #[test]
    fn chain_runs_in_order_and_defaults_to_exit() {
        let order = Arc::new(AtomicUsize::new(0));
        let order_a = order.clone();
        let order_b = order.clone();
        let handlers: Vec<Handler<FakeRaw>> = vec![
            Arc::new(move |_req, _res| -> HandlerResult {
                assert_eq!(order_a.fetch_add(1, Ordering::SeqCst), 0);
                Ok(FlowCode::Continue)
            }),
            Arc::new(move |_req, _res| -> HandlerResult {
                assert_eq!(order_b.fetch_add(1, Ordering::SeqCst), 1);
                Ok(FlowCode::Continue)
            }),
        ];
        let route = Route::new(HttpMethod::Get, "/x", handlers).unwrap();

        struct FakeRawReq;
        impl crate::transport::RawRequest for FakeRawReq {
            fn method(&self) -> &str {
                "GET"
            }
            fn target(&self) -> &str {
                "/x"
            }
            fn version(&self) -> &str {
                "HTTP/1.1"
            }
            fn headers(&self) -> &[(String, String)] {
                &[]
            }
            fn into_body(self: Box<Self>) -> Vec<u8> {
                Vec::new()
            }
        }
        let request = Request::from_raw(Box::new(FakeRawReq)).unwrap();
        let response = Response::from_raw(FakeRaw);

        let outcome = route.handle(&request, &response).unwrap();
        assert_eq!(outcome, FlowCode::Exit);
        assert_eq!(order.load(Ordering::SeqCst), 2);
    }
}
