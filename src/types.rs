//! Core types shared across the engine: HTTP methods, the three-valued flow code
//! returned by middleware and route handlers, and the handler/middleware function
//! aliases used by [`crate::route::Route`] and [`crate::router::Router`].

use crate::error::HttpError;
use crate::req::Request;
use crate::res::Response;
use crate::transport::RawResponse;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

/// The HTTP methods the engine recognizes.
///
/// Anything outside this set fails method validation at the dispatch boundary and
/// produces a 405 before a worker task is ever enqueued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
}

impl HttpMethod {
    /// Returns the canonical, upper-cased method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a method string does not belong to the recognized set.
///
/// Carries the original (upper-cased) text so the caller can report it, e.g. as the
/// `405 Method Not Allowed` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl Display for UnknownMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognized HTTP method: {}", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        match upper.as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(UnknownMethod(upper)),
        }
    }
}

/// The three-valued flow control result returned by middleware and route handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowCode {
    /// Proceed to the next handler/middleware in the chain.
    Continue,
    /// Stop the chain; this is treated as a successful outcome.
    Exit,
    /// Stop the chain; this is treated as a failed outcome.
    Error,
}

/// The result type every handler and middleware function returns: a [`FlowCode`] on
/// the happy path, or an [`HttpError`] value for HTTP-mappable failures.
pub type HandlerResult = Result<FlowCode, HttpError>;

/// A single entry in a [`crate::route::Route`]'s handler chain or a
/// [`crate::router::Router`]'s middleware chain.
///
/// Generic over `T`, the transport's raw response type (bounded by
/// [`RawResponse`]), since [`Response`] itself is generic over it. Boxed as
/// `Arc<dyn Fn(...)>` rather than a bare function pointer so the same handler can be
/// shared between the router that registered it and the worker thread executing it,
/// and so closures capturing configuration state can be registered directly.
pub type Handler<T> =
    Arc<dyn Fn(&Request, &Response<T>) -> HandlerResult + Send + Sync + 'static>;

/// A zero-argument task handed to the [`crate::pool::WorkerPool`]. The pool does not
/// know or care what it runs; it only knows how to run it once and move on.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_seven_recognized_methods() {
        for (text, method) in [
            ("GET", HttpMethod::Get),
            ("post", HttpMethod::Post),
            ("PUT", HttpMethod::Put),
            ("Delete", HttpMethod::Delete),
            ("PATCH", HttpMethod::Patch),
            ("head", HttpMethod::Head),
            ("OPTIONS", HttpMethod::Options),
        ] {
            assert_eq!(text.parse::<HttpMethod>().unwrap(), method);
        }
    }

    #[test]
    fn rejects_unknown_methods() {
        assert!("TRACE".parse::<HttpMethod>().is_err());
        assert!("CONNECT".parse::<HttpMethod>().is_err());
    }
}
