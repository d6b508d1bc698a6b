//! The [`Request`] wrapper: a read-mostly view over a transport-owned message plus the
//! two pieces of per-request mutable state the pipeline needs — captured path
//! parameters and a middleware scratch map.
//!
//! `Request` is move-only: it is constructed once from a [`crate::transport::RawRequest`]
//! and handed off to exactly one worker thread. It is never shared across threads, so
//! the scratch map uses a plain [`RefCell`] rather than a lock — the type is `Send` but
//! deliberately not `Sync`. Path params get an actual [`Mutex`] because the matching
//! [`crate::route::Route`] sets them through a shared reference while a request is
//! mid-dispatch.

pub mod headers;

use crate::transport::RawRequest;
use crate::types::HttpMethod;
use crate::uri::query::split_target;
use headers::Headers;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Mutex;

/// An incoming HTTP request, already parsed by the transport and owned by the engine.
pub struct Request {
    method: HttpMethod,
    uri: String,
    path: String,
    query: String,
    version: String,
    headers: Headers,
    cookies: HashMap<String, String>,
    body: Vec<u8>,
    params: Mutex<Vec<(String, String)>>,
    scratch: RefCell<HashMap<String, String>>,
}

impl Request {
    /// Move-constructs a `Request` from a transport-owned raw message.
    ///
    /// Returns the raw, not-yet-validated method string as `Err` when it does not
    /// belong to the recognized set; the caller (the
    /// server's `on_request_received`) is responsible for turning that into a 405.
    pub fn from_raw(raw: Box<dyn RawRequest>) -> Result<Self, String> {
        let raw_method = raw.method().to_string();
        let method = raw_method
            .parse::<HttpMethod>()
            .map_err(|_| raw_method)?;
        let uri = raw.target().to_string();
        let version = raw.version().to_string();
        let headers = Headers::from_pairs(raw.headers().to_vec());
        let (path, query) = split_target(&uri);
        let (path, query) = (path.to_string(), query.to_string());
        let cookies = parse_cookies(headers.get("cookie"));
        let body = raw.into_body();

        Ok(Self {
            method,
            uri,
            path,
            query,
            version,
            headers,
            cookies,
            body,
            params: Mutex::new(Vec::new()),
            scratch: RefCell::new(HashMap::new()),
        })
    }

    /// The validated HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The full request target as received, e.g. `/users/7?full=true`.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The path portion of the request target, with the query string stripped.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string (after the `?`), or `""` if there was none.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The HTTP version string as received, e.g. `"HTTP/1.1"`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The request body as received.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The first value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Every value of header `name`, in receipt order.
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers.get_all(name)
    }

    /// All headers, in receipt order.
    pub fn headers(&self) -> &[(String, String)] {
        self.headers.all()
    }

    /// The `Content-Type` header value, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// The `Authorization` header value, if present.
    pub fn authorization(&self) -> Option<&str> {
        self.header("authorization")
    }

    /// The `Connection` header value, if present.
    pub fn connection(&self) -> Option<&str> {
        self.header("connection")
    }

    /// True iff any `Connection` header value equals `keep-alive`, case-insensitively.
    pub fn keep_alive(&self) -> bool {
        self.header_all("connection")
            .iter()
            .any(|v| v.eq_ignore_ascii_case("keep-alive"))
    }

    /// A cookie value by name, parsed from the `Cookie` header at construction time.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Replaces the captured path parameters. Called exactly once, by whichever route
    /// matched the request; later calls simply replace the slot.
    pub(crate) fn set_path_params(&self, params: Vec<(String, String)>) {
        *self.params.lock().expect("request params lock poisoned") = params;
    }

    /// A captured path parameter by name.
    pub fn param(&self, name: &str) -> Option<String> {
        self.params
            .lock()
            .expect("request params lock poisoned")
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// All captured path parameters, in capture order.
    pub fn params(&self) -> Vec<(String, String)> {
        self.params.lock().expect("request params lock poisoned").clone()
    }

    /// Sets a scratch-map entry. Not locked; single-writer by convention (the one
    /// worker handling this request) — see spec §4.2 and §9.
    pub fn set_param(&self, key: impl Into<String>, value: impl Into<String>) {
        self.scratch.borrow_mut().insert(key.into(), value.into());
    }

    /// Reads a scratch-map entry.
    pub fn get_param(&self, key: &str) -> Option<String> {
        self.scratch.borrow().get(key).cloned()
    }

    /// All scratch-map entries.
    pub fn get_params(&self) -> HashMap<String, String> {
        self.scratch.borrow().clone()
    }

    /// Removes a scratch-map entry, returning its previous value.
    pub fn remove_param(&self, key: &str) -> Option<String> {
        self.scratch.borrow_mut().remove(key)
    }

    /// Clears the scratch map.
    pub fn clear_params(&self) {
        self.scratch.borrow_mut().clear();
    }
}

fn parse_cookies(header_value: Option<&str>) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    let Some(raw) = header_value else {
        return cookies;
    };
    for part in raw.split(';') {
        let part = part.trim();
        if let Some((name, value)) = part.split_once('=') {
            cookies.insert(name.trim().to_string(), value.trim().to_string());
        }
    }
    cookies
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeRaw {
        method: String,
        target: String,
        version: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    }

    impl RawRequest for FakeRaw {
        fn method(&self) -> &str {
            &self.method
        }
        fn target(&self) -> &str {
            &self.target
        }
        fn version(&self) -> &str {
            &self.version
        }
        fn headers(&self) -> &[(String, String)] {
            &self.headers
        }
        fn into_body(self: Box<Self>) -> Vec<u8> {
            self.body
        }
    }

    fn fake(method: &str, target: &str, headers: Vec<(&str, &str)>) -> Box<dyn RawRequest> {
        Box::new(FakeRaw {
            method: method.to_string(),
            target: target.to_string(),
            version: "HTTP/1.1".to_string(),
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: Vec::new(),
        })
    }

    #[test]
    fn splits_path_and_query_from_target() {
        let req = Request::from_raw(fake("GET", "/stress/42?full=true", vec![])).unwrap();
        assert_eq!(req.path(), "/stress/42");
        assert_eq!(req.query(), "full=true");
    }

    #[test]
    fn rejects_unknown_methods_with_the_raw_text() {
        let err = Request::from_raw(fake("TRACE", "/x", vec![])).unwrap_err();
        assert_eq!(err, "TRACE");
    }

    #[test]
    fn parses_cookie_header_on_semicolons() {
        let req = Request::from_raw(fake(
            "GET",
            "/",
            vec![("Cookie", "session=abc; theme = dark")],
        ))
        .unwrap();
        assert_eq!(req.cookie("session"), Some("abc"));
        assert_eq!(req.cookie("theme"), Some("dark"));
    }

    #[test]
    fn keep_alive_is_case_insensitive() {
        let req = Request::from_raw(fake("GET", "/", vec![("Connection", "Keep-Alive")])).unwrap();
        assert!(req.keep_alive());
    }

    #[test]
    fn path_params_are_set_once_by_the_matching_route() {
        let req = Request::from_raw(fake("GET", "/stress/42", vec![])).unwrap();
        req.set_path_params(vec![("id".to_string(), "42".to_string())]);
        assert_eq!(req.param("id"), Some("42".to_string()));
    }

    #[test]
    fn scratch_map_is_free_form_and_mutable() {
        let req = Request::from_raw(fake("GET", "/", vec![])).unwrap();
        req.set_param("user_id", "7");
        assert_eq!(req.get_param("user_id"), Some("7".to_string()));
        req.remove_param("user_id");
        assert_eq!(req.get_param("user_id"), None);
    }
}
