//! The ordered middleware chain + ordered routes.

use crate::error::{HttpError, RipcoreError};
use crate::log::Logger;
use crate::req::Request;
use crate::res::Response;
use crate::route::Route;
use crate::transport::RawResponse;
use crate::types::{FlowCode, Handler, HttpMethod};

/// An ordered middleware chain plus an ordered set of routes. Routers are registered
/// on the [`crate::server::Server`] in insertion order; first matching route across
/// routers wins.
pub struct Router<T: RawResponse> {
    middleware: Vec<Handler<T>>,
    routes: Vec<Route<T>>,
}

impl<T: RawResponse> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RawResponse> Router<T> {
    /// An empty router: no middleware, no routes.
    pub fn new() -> Self {
        Self { middleware: Vec::new(), routes: Vec::new() }
    }

    /// Appends a middleware to the chain.
    pub fn use_middleware(&mut self, handler: Handler<T>) {
        self.middleware.push(handler);
    }

    /// Registers a route. Rejects an empty path expression with
    /// [`RipcoreError::InvalidArgument`]; an empty handler chain is rejected by
    /// [`Route::new`] itself.
    pub fn add_route(
        &mut self,
        method: HttpMethod,
        pattern: impl Into<String>,
        handlers: Vec<Handler<T>>,
    ) -> Result<(), RipcoreError> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(RipcoreError::invalid_argument("route pattern must not be empty"));
        }
        let route = Route::new(method, pattern, handlers)?;
        self.routes.push(route);
        Ok(())
    }

    /// Convenience wrapper around [`Router::add_route`] for `GET`.
    pub fn get(&mut self, pattern: impl Into<String>, handlers: Vec<Handler<T>>) -> Result<(), RipcoreError> {
        self.add_route(HttpMethod::Get, pattern, handlers)
    }

    /// Convenience wrapper around [`Router::add_route`] for `POST`.
    pub fn post(&mut self, pattern: impl Into<String>, handlers: Vec<Handler<T>>) -> Result<(), RipcoreError> {
        self.add_route(HttpMethod::Post, pattern, handlers)
    }

    /// Convenience wrapper around [`Router::add_route`] for `PUT`.
    pub fn put(&mut self, pattern: impl Into<String>, handlers: Vec<Handler<T>>) -> Result<(), RipcoreError> {
        self.add_route(HttpMethod::Put, pattern, handlers)
    }

    /// Convenience wrapper around [`Router::add_route`] for `DELETE`.
    pub fn delete(&mut self, pattern: impl Into<String>, handlers: Vec<Handler<T>>) -> Result<(), RipcoreError> {
        self.add_route(HttpMethod::Delete, pattern, handlers)
    }

    /// Runs the middleware chain, then does first-match route dispatch.
    ///
    /// Returns `Ok(true)` if this router handled the request (a middleware exited the
    /// chain, or a route matched), `Ok(false)` if no middleware short-circuited and no
    /// route matched. Any [`HttpError`] raised by middleware or a route handler is
    /// logged and rethrown — the router never renders a response itself.
    pub fn handle(
        &self,
        request: &Request,
        response: &Response<T>,
        logger: &dyn Logger,
    ) -> Result<bool, HttpError> {
        let result = self.dispatch(request, response);
        if let Err(ref err) = result {
            logger.error(&format!("router chain failed: {err}"));
        }
        result
    }

    fn dispatch(&self, request: &Request, response: &Response<T>) -> Result<bool, HttpError> {
        for middleware in &self.middleware {
            match middleware(request, response)? {
                FlowCode::Continue => continue,
                FlowCode::Exit | FlowCode::Error => return Ok(true),
            }
        }

        for route in &self.routes {
            if route.matches(request) {
                route.handle(request, response)?;
                return Ok(true);
            }
        }

        Ok(false)
    }
}
