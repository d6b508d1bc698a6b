//! The transport contract this engine consumes. A transport hands the engine an owned
//! request message and an owned, not-yet-sent response handle; the engine never
//! touches sockets, TLS, or HTTP framing itself.
//!
//! Modeled as traits rather than an abstract base class, per REDESIGN FLAGS §9 — the
//! engine is generic over whatever response handle a transport supplies, bounded by
//! [`RawResponse`], instead of reaching for a boxed/virtual interface.

/// The owned, parsed request message a transport hands to the engine.
///
/// Implementors own their data outright (no borrowed buffers) so that
/// [`crate::req::Request`] can be move-constructed from one without retaining any
/// transport-specific type.
pub trait RawRequest {
    /// The request method, as received on the wire (not yet validated).
    fn method(&self) -> &str;
    /// The request target as received on the wire, e.g. `/users/7?full=true`.
    fn target(&self) -> &str;
    /// The HTTP version string, e.g. `"HTTP/1.1"`.
    fn version(&self) -> &str;
    /// Header field, value pairs in receipt order. Field names are not assumed to be
    /// normalized by the transport; the engine lower-cases them itself.
    fn headers(&self) -> &[(String, String)];
    /// Consumes `self`, returning the body bytes read so far.
    fn into_body(self: Box<Self>) -> Vec<u8>;
}

/// A live connection handle, usable only from the headers-received hook to close the
/// connection early.
pub trait Connection: Send {
    /// Closes the underlying connection.
    fn close(&mut self);
}

/// The not-yet-sent response handle a transport hands to the engine.
///
/// [`crate::res::Response`] wraps exactly one value implementing this trait and calls
/// `send`/`end` on it at most once each, guarded by its own idempotency latches — a
/// `RawResponse` implementation does not need to defend against repeated calls itself.
pub trait RawResponse: Send + 'static {
    /// Writes the status line, headers, and body to the wire. Called at most once.
    fn send(
        &mut self,
        status: u16,
        reason: &str,
        headers: &[(String, String)],
        body: &[u8],
    ) -> std::io::Result<()>;

    /// Finalizes the response after `send`, e.g. flushing and closing out the
    /// connection's write side. Called at most once, always after `send`.
    fn end(&mut self) -> std::io::Result<()>;
}
