//! An embeddable HTTP request-routing and dispatch engine.
//!
//! Given already-parsed requests from a transport, the engine runs a pipeline of
//! user-registered middleware and route handlers against each one, and finalizes the
//! response exactly once, safely across worker threads. It does not open sockets,
//! parse HTTP, or terminate TLS — those are the transport's job, described by the
//! traits in [`transport`].
//!
//! The moving pieces:
//! - [`uri`] — path-pattern matching, URL encode/decode, query parsing, MIME lookup.
//! - [`req`] / [`res`] — the per-request wrapper types.
//! - [`route`] / [`router`] — ordered handler chains and first-match dispatch.
//! - [`pool`] — the worker pool requests are dispatched onto.
//! - [`server`] — adapts transport callbacks onto the pipeline above.
//! - [`error`] — [`error::HttpError`] (a renderable HTTP failure) and
//!   [`error::RipcoreError`] (an internal configuration/invariant failure).
//! - [`log`] — the logger contract the engine calls into.

#![warn(missing_docs)]

pub mod error;
pub mod log;
pub mod pool;
pub mod req;
pub mod res;
pub mod route;
pub mod router;
pub mod server;
pub mod transport;
pub mod types;
pub mod uri;

pub use error::{HttpError, RipcoreError};
pub use req::Request;
pub use res::Response;
pub use route::Route;
pub use router::Router;
pub use server::{Server, ServerConfig};
pub use types::{FlowCode, HandlerResult, HttpMethod};
