//! Adapts transport callbacks, owns routers + static dirs, serves static files,
//! dispatches onto the worker pool, and invokes the unhandled-error hook.
//!
//! [`ServerConfig`] gathers worker count and the [`Logger`] implementation into one
//! struct supplied to [`Server::new`], rather than a long constructor parameter list.

use crate::error::{HttpError, RipcoreError};
use crate::log::{Logger, TracingLogger};
use crate::pool::WorkerPool;
use crate::req::Request;
use crate::res::Response;
use crate::router::Router;
use crate::transport::{Connection, RawRequest, RawResponse};
use crate::types::{FlowCode, Handler, HandlerResult, HttpMethod};
use crate::uri::mime;
use crate::uri::path::sanitize_path;
use std::path::PathBuf;
use std::sync::Arc;

/// Worker count, logger, and any other ambient knobs the server is built with.
pub struct ServerConfig {
    /// Number of worker threads. `None` uses `std::thread::available_parallelism()`.
    pub worker_count: Option<usize>,
    /// The logger every component reaches for.
    pub logger: Arc<dyn Logger>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { worker_count: None, logger: Arc::new(TracingLogger) }
    }
}

/// A hook invoked once the pipeline has produced an [`HttpError`] that nothing else
/// handled.
pub type ErrorHook<T> = Arc<dyn Fn(&HttpError, &Request, &Response<T>) + Send + Sync>;

/// A listen-started hook, invoked once the transport confirms it is accepting
/// connections.
pub type ListenHook = Arc<dyn Fn() + Send + Sync>;

/// A transport-error hook.
/// The core only logs; this hook is the user's chance to react.
pub type TransportErrorHook = Arc<dyn Fn(&str) + Send + Sync>;

/// A pass-through hook invoked when headers (only) have been parsed, before the body
/// has necessarily arrived in full.
pub type HeadersReceivedHook = Arc<
    dyn Fn(&mut dyn Connection, &[(String, String)], &str, &str, &str, &[u8]) + Send + Sync,
>;

/// The frozen, read-only state shared between `listen()` and every worker thread.
struct ServerState<T: RawResponse> {
    routers: Vec<Router<T>>,
    static_dirs: Vec<PathBuf>,
    default_handler: Handler<T>,
    error_hook: ErrorHook<T>,
    logger: Arc<dyn Logger>,
}

fn default_not_found<T: RawResponse>() -> Handler<T> {
    Arc::new(|_req, res| -> HandlerResult {
        res.set_status(404, "Not Found");
        res.set_body("404 Not Found");
        Ok(FlowCode::Exit)
    })
}

fn default_error_hook<T: RawResponse>() -> ErrorHook<T> {
    Arc::new(|err, _req, res| {
        res.set_status(err.code(), err.reason());
        res.set_body("Internal Server Error");
    })
}

/// Adapts a transport's callbacks onto the routing/dispatch pipeline.
///
/// Registration methods (`use_router`, `use_static`, `use_default`, `use_error`,
/// `get`/`post`/`put`/`delete_`) are only valid before [`Server::listen`]; afterward
/// routers, static dirs, and hooks are frozen and further registration is rejected.
pub struct Server<T: RawResponse> {
    host: String,
    port: u16,
    config: ServerConfig,
    routers: Vec<Router<T>>,
    static_dirs: Vec<PathBuf>,
    default_handler: Handler<T>,
    error_hook: ErrorHook<T>,
    headers_received_hook: Option<HeadersReceivedHook>,
    on_listen: Option<ListenHook>,
    on_transport_error: Option<TransportErrorHook>,
    pool: Option<WorkerPool>,
    state: Option<Arc<ServerState<T>>>,
}

impl<T: RawResponse> Server<T> {
    /// Builds a server with one empty primary router already registered.
    ///
    /// `host`/`port` are opaque to the core — the engine never opens a socket itself; it
    /// only remembers these for [`Server::address`] so a transport or log line can
    /// report them.
    pub fn new(host: impl Into<String>, port: u16, config: ServerConfig) -> Self {
        Self {
            host: host.into(),
            port,
            config,
            routers: vec![Router::new()],
            static_dirs: Vec::new(),
            default_handler: default_not_found(),
            error_hook: default_error_hook(),
            headers_received_hook: None,
            on_listen: None,
            on_transport_error: None,
            pool: None,
            state: None,
        }
    }

    fn primary_router_mut(&mut self) -> Result<&mut Router<T>, RipcoreError> {
        self.ensure_not_listening()?;
        Ok(self.routers.first_mut().expect("server always has a primary router"))
    }

    fn ensure_not_listening(&self) -> Result<(), RipcoreError> {
        if self.state.is_some() {
            return Err(RipcoreError::invalid_argument(
                "cannot register routes/hooks after listen() has been called",
            ));
        }
        Ok(())
    }

    /// Registers an additional router, run after all previously registered ones.
    pub fn use_router(&mut self, router: Router<T>) -> Result<(), RipcoreError> {
        self.ensure_not_listening()?;
        self.routers.push(router);
        Ok(())
    }

    /// Appends a static-asset root directory, tried in registration order.
    pub fn use_static(&mut self, dir: impl Into<PathBuf>) -> Result<(), RipcoreError> {
        self.ensure_not_listening()?;
        self.static_dirs.push(dir.into());
        Ok(())
    }

    /// Replaces the unmatched-route handler (default: 404 "Not Found").
    pub fn use_default(&mut self, handler: Handler<T>) -> Result<(), RipcoreError> {
        self.ensure_not_listening()?;
        self.default_handler = handler;
        Ok(())
    }

    /// Replaces the unhandled-exception hook (default: status/reason/body from the
    /// `HttpError`).
    pub fn use_error(&mut self, hook: ErrorHook<T>) -> Result<(), RipcoreError> {
        self.ensure_not_listening()?;
        self.error_hook = hook;
        Ok(())
    }

    /// Registers the headers-received hook. The core treats this purely
    /// as a pass-through: it is only ever invoked via [`Server::on_headers_received`],
    /// which the transport calls once headers (only) are parsed.
    pub fn use_headers_received(&mut self, hook: HeadersReceivedHook) -> Result<(), RipcoreError> {
        self.ensure_not_listening()?;
        self.headers_received_hook = Some(hook);
        Ok(())
    }

    /// Registers a `GET` route on the primary router.
    pub fn get(&mut self, pattern: impl Into<String>, handlers: Vec<Handler<T>>) -> Result<(), RipcoreError> {
        self.primary_router_mut()?.add_route(HttpMethod::Get, pattern, handlers)
    }

    /// Registers a `POST` route on the primary router.
    pub fn post(&mut self, pattern: impl Into<String>, handlers: Vec<Handler<T>>) -> Result<(), RipcoreError> {
        self.primary_router_mut()?.add_route(HttpMethod::Post, pattern, handlers)
    }

    /// Registers a `PUT` route on the primary router.
    pub fn put(&mut self, pattern: impl Into<String>, handlers: Vec<Handler<T>>) -> Result<(), RipcoreError> {
        self.primary_router_mut()?.add_route(HttpMethod::Put, pattern, handlers)
    }

    /// Registers a `DELETE` route on the primary router.
    pub fn delete(&mut self, pattern: impl Into<String>, handlers: Vec<Handler<T>>) -> Result<(), RipcoreError> {
        self.primary_router_mut()?.add_route(HttpMethod::Delete, pattern, handlers)
    }

    /// Freezes routers/static dirs/hooks into an immutable [`ServerState`] and starts
    /// the worker pool. `on_listen`/`on_error` are stored for [`Server::on_listen_success`]
    /// and [`Server::on_transport_error`] to invoke once the transport actually confirms
    /// those events.
    ///
    /// Idempotent only in the sense that calling it twice replaces the pool; real
    /// transports call it exactly once.
    pub fn listen(&mut self, on_listen: Option<ListenHook>, on_error: Option<TransportErrorHook>) {
        self.on_listen = on_listen;
        self.on_transport_error = on_error;

        let worker_count = self.config.worker_count;
        let pool = match worker_count {
            Some(count) => WorkerPool::new(count),
            None => WorkerPool::with_default_worker_count(),
        };

        let state = Arc::new(ServerState {
            routers: std::mem::take(&mut self.routers),
            static_dirs: std::mem::take(&mut self.static_dirs),
            default_handler: self.default_handler.clone(),
            error_hook: self.error_hook.clone(),
            logger: self.config.logger.clone(),
        });

        self.pool = Some(pool);
        self.state = Some(state);
    }

    /// The opaque `(host, port)` this server was constructed with.
    pub fn address(&self) -> (&str, u16) {
        (&self.host, self.port)
    }

    /// The transport callback for a fully-parsed request.
    ///
    /// Rejects unknown methods with a 405 directly, without enqueuing any work.
    /// Otherwise hands `request_handler` to the worker pool.
    pub fn on_request_received(&self, raw_request: Box<dyn RawRequest>, raw_response: T) {
        let state = self
            .state
            .clone()
            .expect("on_request_received called before listen()");
        let response = Response::from_raw(raw_response);

        let request = match Request::from_raw(raw_request) {
            Ok(request) => request,
            Err(_unknown_method) => {
                response.set_status(405, "Method Not Allowed");
                response.set_body("405 Method Not Allowed");
                response.send(state.logger.as_ref());
                return;
            }
        };

        let logger_for_enqueue = state.logger.clone();
        self.pool
            .as_ref()
            .expect("on_request_received called before listen()")
            .enqueue(Box::new(move || {
                request_handler(state, request, response, logger_for_enqueue.as_ref());
            }));
    }

    /// The transport callback fired once the transport confirms it is accepting
    /// connections. A pass-through to whichever hook was
    /// given to [`Server::listen`].
    pub fn on_listen_success(&self) {
        if let Some(hook) = &self.on_listen {
            hook();
        }
    }

    /// The transport callback for an error surfaced by the transport itself, outside
    /// of any single request.
    /// The core only logs; the transport-error hook is the user's chance to react.
    pub fn on_exception_occurred(&self, message: &str) {
        if let Some(state) = &self.state {
            state.logger.error(&format!("transport error: {message}"));
        }
        if let Some(hook) = &self.on_transport_error {
            hook(message);
        }
    }

    /// The transport callback fired once headers (only) have been parsed, before the
    /// body has necessarily arrived in full. Pure
    /// pass-through: the core does not inspect or act on the call itself.
    pub fn on_headers_received(
        &self,
        connection: &mut dyn Connection,
        headers: &[(String, String)],
        method: &str,
        uri: &str,
        version: &str,
        partial_body: &[u8],
    ) {
        if let Some(hook) = &self.headers_received_hook {
            hook(connection, headers, method, uri, version, partial_body);
        }
    }

    /// Stops accepting further work: shuts down the worker pool, draining whatever is
    /// already queued, and joins every worker thread. The transport is responsible for
    /// closing its own listening socket; this only tears down the dispatch side.
    pub fn stop(&mut self) {
        if let Some(mut pool) = self.pool.take() {
            pool.shutdown();
        }
    }
}

/// Runs on a worker thread: static file, then routers in order, then the unmatched-
/// route fallback; always finishes with `send` then `end`.
fn request_handler<T: RawResponse>(
    state: Arc<ServerState<T>>,
    request: Request,
    response: Response<T>,
    logger: &dyn Logger,
) {
    let outcome = dispatch(&state, &request, &response);

    if let Err(err) = outcome {
        logger.error(&format!("unhandled error dispatching request: {err}"));
        (state.error_hook)(&err, &request, &response);
    }

    response.send(logger);
    response.end(logger);
}

fn dispatch<T: RawResponse>(
    state: &ServerState<T>,
    request: &Request,
    response: &Response<T>,
) -> Result<(), HttpError> {
    if mime::is_static_asset(request.path()) {
        serve_static(state, request, response);
        return Ok(());
    }

    for router in &state.routers {
        if router.handle(request, response, state.logger.as_ref())? {
            return Ok(());
        }
    }

    (state.default_handler)(request, response)?;
    Ok(())
}

/// Sanitizes the request path, then tries each static root in registration order until
/// a file opens. Traversal defense: `sanitize_path` deletes
/// every `..` occurrence before any path ever reaches the filesystem.
fn serve_static<T: RawResponse>(state: &ServerState<T>, request: &Request, response: &Response<T>) {
    let sanitized = sanitize_path(request.path());
    let relative = sanitized.trim_start_matches('/');

    for root in &state.static_dirs {
        let candidate = root.join(relative);
        match std::fs::read(&candidate) {
            Ok(bytes) => {
                response.set_status(200, "OK");
                response.set_content_type(mime::mime_for(&sanitized));
                response.set_body(bytes);
                return;
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) => {
                let http_err: HttpError = err.into();
                (state.error_hook)(&http_err, request, response);
                return;
            }
        }
    }

    response.set_status(404, "Not Found");
    response.set_body("404 Not Found");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::NullLogger;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Clone)]
    struct FakeRaw {
        sent: Arc<Mutex<Option<(u16, String, Vec<u8>)>>>,
    }
    impl RawResponse for FakeRaw {
        fn send(&mut self, status: u16, reason: &str, _headers: &[(String, String)], body: &[u8]) -> std::io::Result<()> {
            *self.sent.lock().unwrap() = Some((status, reason.to_string(), body.to_vec()));
            Ok(())
        }
        fn end(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct FakeRawReq {
        method: &'static str,
        target: &'static str,
    }
    impl RawRequest for FakeRawReq {
        fn method(&self) -> &str {
            self.method
        }
        fn target(&self) -> &str {
            self.target
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

    fn config() -> ServerConfig {
        ServerConfig { worker_count: Some(2), logger: Arc::new(NullLogger) }
    }

    #[test]
    fn unknown_method_gets_405_without_enqueuing_a_task() {
        let mut server: Server<FakeRaw> = Server::new("127.0.0.1", 8080, config());
        server.listen(None, None);
        let sent = Arc::new(Mutex::new(None));
        server.on_request_received(
            Box::new(FakeRawReq { method: "TRACE", target: "/x" }),
            FakeRaw { sent: sent.clone() },
        );
        let (status, _, body) = sent.lock().unwrap().clone().unwrap();
        assert_eq!(status, 405);
        assert_eq!(body, b"405 Method Not Allowed");
    }

    #[test]
    fn unmatched_route_gets_default_404() {
        let mut server: Server<FakeRaw> = Server::new("127.0.0.1", 8080, config());
        server.listen(None, None);
        let sent = Arc::new(Mutex::new(None));
        server.on_request_received(
            Box::new(FakeRawReq { method: "GET", target: "/nope" }),
            FakeRaw { sent: sent.clone() },
        );
        std::thread::sleep(std::time::Duration::from_millis(50));
        let (status, _, body) = sent.lock().unwrap().clone().unwrap();
        assert_eq!(status, 404);
        assert_eq!(body, b"404 Not Found");
    }

    #[test]
    fn registered_route_runs_and_captures_params() {
        let mut server: Server<FakeRaw> = Server::new("127.0.0.1", 8080, config());
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_inner = hits.clone();
        server
            .get(
                "/stress/:id",
                vec![Arc::new(move |req, res| -> HandlerResult {
                    hits_inner.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(req.param("id"), Some("42".to_string()));
                    res.send_text("ok", &NullLogger);
                    Ok(FlowCode::Exit)
                })],
            )
            .unwrap();
        server.listen(None, None);

        let sent = Arc::new(Mutex::new(None));
        server.on_request_received(
            Box::new(FakeRawReq { method: "GET", target: "/stress/42" }),
            FakeRaw { sent: sent.clone() },
        );
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let (status, _, body) = sent.lock().unwrap().clone().unwrap();
        assert_eq!(status, 200);
        assert_eq!(body, b"ok");
    }

    #[test]
    fn registration_after_listen_is_rejected() {
        let mut server: Server<FakeRaw> = Server::new("127.0.0.1", 8080, config());
        server.listen(None, None);
        assert!(server.get("/late", vec![Arc::new(|_, _| Ok(FlowCode::Exit))]).is_err());
    }

    #[test]
    fn on_listen_success_invokes_the_registered_hook() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_inner = fired.clone();
        let mut server: Server<FakeRaw> = Server::new("127.0.0.1", 8080, config());
        server.listen(Some(Arc::new(move || { fired_inner.fetch_add(1, Ordering::SeqCst); })), None);
        server.on_listen_success();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn on_exception_occurred_forwards_to_the_transport_error_hook() {
        let seen = Arc::new(Mutex::new(None));
        let seen_inner = seen.clone();
        let mut server: Server<FakeRaw> = Server::new("127.0.0.1", 8080, config());
        server.listen(None, Some(Arc::new(move |msg: &str| { *seen_inner.lock().unwrap() = Some(msg.to_string()); })));
        server.on_exception_occurred("socket reset");
        assert_eq!(seen.lock().unwrap().as_deref(), Some("socket reset"));
    }

    #[test]
    fn stop_shuts_down_the_worker_pool() {
        let mut server: Server<FakeRaw> = Server::new("127.0.0.1", 8080, config());
        server.listen(None, None);
        server.stop();
        assert!(server.pool.is_none());
    }

    #[test]
    fn address_reports_the_opaque_host_and_port() {
        let server: Server<FakeRaw> = Server::new("0.0.0.0", 9000, config());
        assert_eq!(server.address(), ("0.0.0.0", 9000));
    }
}
