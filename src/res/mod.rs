//! The [`Response`] wrapper: buffered status/headers/body with idempotent `send`/`end`
//! and fine-grained locking.
//!
//! `Response<T>` is generic over `T: RawResponse`, the transport's not-yet-sent
//! response handle.
//! Handlers hold only a shared `&Response<T>` — the same handle is passed down the
//! whole middleware + route chain — so every write operation goes through an internal
//! lock rather than requiring `&mut self`. Two [`AtomicBool`] latches make `send` and
//! `end` safe to call any number of times from any number of places in that chain.
//!
//! Copying is forbidden (no `Clone` impl); moving is permitted, matching spec §4.3.

use crate::error::RipcoreError;
use crate::log::Logger;
use crate::transport::RawResponse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

struct ResponseState {
    status: u16,
    reason: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

/// A not-yet-sent HTTP response, owning the transport's raw response handle.
pub struct Response<T: RawResponse> {
    state: Mutex<ResponseState>,
    raw: Mutex<Option<T>>,
    sent: AtomicBool,
    ended: AtomicBool,
    send_lock: Mutex<()>,
    end_lock: Mutex<()>,
}

impl<T: RawResponse> Response<T> {
    /// Move-constructs a `Response` from the transport's owned, not-yet-sent handle.
    /// Status defaults to 200/"OK".
    pub fn from_raw(raw: T) -> Self {
        Self {
            state: Mutex::new(ResponseState {
                status: 200,
                reason: "OK".to_string(),
                headers: Vec::new(),
                body: Vec::new(),
            }),
            raw: Mutex::new(Some(raw)),
            sent: AtomicBool::new(false),
            ended: AtomicBool::new(false),
            send_lock: Mutex::new(()),
            end_lock: Mutex::new(()),
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ResponseState> {
        self.state.lock().expect("response state lock poisoned")
    }

    /// Sets the status code and reason phrase.
    pub fn set_status(&self, code: u16, reason: impl Into<String>) -> &Self {
        let mut state = self.lock_state();
        state.status = code;
        state.reason = reason.into();
        drop(state);
        self
    }

    /// Replaces the response body.
    pub fn set_body(&self, body: impl AsRef<[u8]>) -> &Self {
        self.lock_state().body = body.as_ref().to_vec();
        self
    }

    /// Sets `Content-Type`, overwriting any prior value.
    pub fn set_content_type(&self, mime: impl Into<String>) -> &Self {
        let mut state = self.lock_state();
        state.headers.retain(|(n, _)| !n.eq_ignore_ascii_case("content-type"));
        state.headers.push(("Content-Type".to_string(), mime.into()));
        self
    }

    /// Appends a header. Does not deduplicate against existing headers of the same
    /// name.
    pub fn add_header(&self, name: impl Into<String>, value: impl Into<String>) -> &Self {
        self.lock_state().headers.push((name.into(), value.into()));
        self
    }

    /// Appends a trailer. Modeled identically to a header at this layer; the transport
    /// is responsible for placing it after the body on the wire.
    pub fn add_trailer(&self, name: impl Into<String>, value: impl Into<String>) -> &Self {
        self.add_header(name, value)
    }

    /// Appends a `Set-Cookie: name=value[; attrs]` header. Cookies are never
    /// deduplicated.
    pub fn add_cookie(&self, name: &str, value: &str, attrs: &[(&str, &str)]) -> &Self {
        let mut cookie = format!("{}={}", name, value);
        for (attr_name, attr_value) in attrs {
            if attr_value.is_empty() {
                cookie.push_str(&format!("; {}", attr_name));
            } else {
                cookie.push_str(&format!("; {}={}", attr_name, attr_value));
            }
        }
        self.add_header("Set-Cookie", cookie)
    }

    /// Shorthand for `set_status(200, "OK")`.
    pub fn ok(&self) -> &Self {
        self.set_status(200, "OK")
    }

    /// Shorthand for `set_status(404, "Not Found")`.
    pub fn not_found(&self) -> &Self {
        self.set_status(404, "Not Found")
    }

    /// Shorthand for `set_status(400, "Bad Request")`.
    pub fn bad_request(&self) -> &Self {
        self.set_status(400, "Bad Request")
    }

    /// Shorthand for `set_status(401, "Unauthorized")`.
    pub fn unauthorized(&self) -> &Self {
        self.set_status(401, "Unauthorized")
    }

    /// Shorthand for `set_status(405, "Method Not Allowed")`.
    pub fn method_not_allowed(&self) -> &Self {
        self.set_status(405, "Method Not Allowed")
    }

    /// Shorthand for `set_status(500, "Internal Server Error")`.
    pub fn internal_server_error(&self) -> &Self {
        self.set_status(500, "Internal Server Error")
    }

    /// The current status code.
    pub fn status_code(&self) -> u16 {
        self.lock_state().status
    }

    /// `send`, after setting `Content-Type: application/json` and the JSON-encoded
    /// body.
    pub fn send_json<V: serde::Serialize>(&self, value: &V, logger: &dyn Logger) -> Result<(), RipcoreError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| RipcoreError::invalid_argument(format!("failed to encode JSON body: {e}")))?;
        self.set_content_type("application/json");
        self.set_body(bytes);
        self.send(logger);
        Ok(())
    }

    /// `send`, after setting `Content-Type: text/html` and the given body.
    pub fn send_html(&self, html: impl AsRef<[u8]>, logger: &dyn Logger) {
        self.set_content_type("text/html");
        self.set_body(html);
        self.send(logger);
    }

    /// `send`, after setting `Content-Type: text/plain` and the given body.
    pub fn send_text(&self, text: impl AsRef<[u8]>, logger: &dyn Logger) {
        self.set_content_type("text/plain");
        self.set_body(text);
        self.send(logger);
    }

    /// Transmits the response. Safe to call any number of times: only the first call
    /// has any effect.
    ///
    /// 1. CAS `sent` false→true; a prior `true` makes this a no-op.
    /// 2. Under the header-mutation lock, fills in `Connection` and `Content-Length`
    ///    when absent.
    /// 3. Under the send lock, hands status/headers/body to the transport's raw
    ///    response.
    /// 4. Any transport error is caught, logged, and `end()` is still invoked.
    pub fn send(&self, logger: &dyn Logger) {
        if self.sent.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return;
        }

        let (status, reason, headers, body) = {
            let mut state = self.lock_state();
            if !state.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case("connection")) {
                state.headers.push(("Connection".to_string(), "close".to_string()));
            }
            if !state.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case("content-length")) {
                state
                    .headers
                    .push(("Content-Length".to_string(), state.body.len().to_string()));
            }
            (state.status, state.reason.clone(), state.headers.clone(), state.body.clone())
        };

        let _send_guard = self.send_lock.lock().expect("response send lock poisoned");
        let mut raw = self.raw.lock().expect("response raw lock poisoned");
        if let Some(handle) = raw.as_mut() {
            if let Err(err) = handle.send(status, &reason, &headers, &body) {
                logger.error(&format!("response send failed: {err}"));
            }
        }
        drop(raw);
        drop(_send_guard);

        self.end(logger);
    }

    /// Finalizes the response after `send`. Safe to call any number of times: only the
    /// first call has any effect.
    pub fn end(&self, logger: &dyn Logger) {
        if self.ended.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return;
        }

        let _end_guard = self.end_lock.lock().expect("response end lock poisoned");
        let mut raw = self.raw.lock().expect("response raw lock poisoned");
        if let Some(handle) = raw.as_mut() {
            if let Err(err) = handle.end() {
                logger.error(&format!("response end failed: {err}"));
            }
        }
    }

    /// True once `send` has run (or is running).
    pub fn is_sent(&self) -> bool {
        self.sent.load(Ordering::SeqCst)
    }

    /// True once `end` has run (or is running).
    pub fn is_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::NullLogger;
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordedSend {
        status: u16,
        reason: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    }

    struct FakeRaw {
        sends: Arc<StdMutex<Vec<RecordedSend>>>,
        ends: Arc<StdMutex<u32>>,
    }

    impl RawResponse for FakeRaw {
        fn send(
            &mut self,
            status: u16,
            reason: &str,
            headers: &[(String, String)],
            body: &[u8],
        ) -> std::io::Result<()> {
            self.sends.lock().unwrap().push(RecordedSend {
                status,
                reason: reason.to_string(),
                headers: headers.to_vec(),
                body: body.to_vec(),
            });
            Ok(())
        }

        fn end(&mut self) -> std::io::Result<()> {
            *self.ends.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[test]
    fn send_is_idempotent() {
        let sends = Arc::new(StdMutex::new(Vec::new()));
        let ends = Arc::new(StdMutex::new(0));
        let res = Response::from_raw(FakeRaw { sends: sends.clone(), ends: ends.clone() });
        let logger = NullLogger;

        res.send_text("a", &logger);
        res.send_json(&serde_json::json!({"b": 1}), &logger).unwrap();

        assert_eq!(sends.lock().unwrap().len(), 1);
        assert_eq!(sends.lock().unwrap()[0].body, b"a");
        assert_eq!(*ends.lock().unwrap(), 1);
    }

    #[test]
    fn send_fills_in_missing_connection_and_content_length() {
        let sends = Arc::new(StdMutex::new(Vec::new()));
        let ends = Arc::new(StdMutex::new(0));
        let res = Response::from_raw(FakeRaw { sends: sends.clone(), ends: ends.clone() });
        res.set_body("hello");
        res.send(&NullLogger);

        let recorded = &sends.lock().unwrap()[0];
        let header = |name: &str| {
            recorded
                .headers
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone())
        };
        assert_eq!(header("Connection"), Some("close".to_string()));
        assert_eq!(header("Content-Length"), Some("5".to_string()));
    }

    #[test]
    fn end_is_idempotent_independent_of_send() {
        let sends = Arc::new(StdMutex::new(Vec::new()));
        let ends = Arc::new(StdMutex::new(0));
        let res = Response::from_raw(FakeRaw { sends, ends: ends.clone() });
        res.end(&NullLogger);
        res.end(&NullLogger);
        assert_eq!(*ends.lock().unwrap(), 1);
    }

    #[test]
    fn add_cookie_does_not_deduplicate() {
        let sends = Arc::new(StdMutex::new(Vec::new()));
        let ends = Arc::new(StdMutex::new(0));
        let res = Response::from_raw(FakeRaw { sends: sends.clone(), ends });
        res.add_cookie("a", "1", &[]);
        res.add_cookie("a", "1", &[]);
        res.send(&NullLogger);

        let cookies: Vec<_> = sends.lock().unwrap()[0]
            .headers
            .iter()
            .filter(|(n, _)| n == "Set-Cookie")
            .count();
        assert_eq!(cookies, 2);
    }
}
