//! Internal error taxonomy for the engine.
//!
//! [`HttpError`] is a *value*, not a control primitive: handlers return it (or an
//! equivalent `Result::Err`) when a failure is HTTP-mappable, the [`crate::router::Router`]
//! catches-logs-rethrows it, and the [`crate::server::Server`] is the only place that turns
//! it into bytes on the wire. [`RipcoreError`] is the separate, narrower error used for
//! failures that are not about the HTTP response at all — an empty handler chain at
//! construction time, an unrecognized flow code, a pattern that can't be parsed.

use std::fmt::Display;

/// The broad category of an internal (non-HTTP) engine failure.
#[derive(Debug, PartialEq, Eq)]
pub enum RipcoreErrorKind {
    /// A route or router was constructed with an invalid argument (empty handler
    /// chain, empty path expression).
    InvalidArgument,
    /// A handler or middleware returned a flow code outside of
    /// `{CONTINUE, EXIT, ERROR}`.
    InvariantViolation,
    /// An I/O failure, typically while serving a static file.
    IO,
    /// The worker pool could not accept or run a task (e.g. after shutdown).
    PoolShutdown,
}

impl Display for RipcoreErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RipcoreErrorKind::InvalidArgument => write!(f, "invalid argument"),
            RipcoreErrorKind::InvariantViolation => write!(f, "invariant violation"),
            RipcoreErrorKind::IO => write!(f, "I/O error"),
            RipcoreErrorKind::PoolShutdown => write!(f, "worker pool shut down"),
        }
    }
}

/// A structured error type for failures internal to the engine.
///
/// `RipcoreError` is distinct from [`HttpError`]: it never carries a status code of its
/// own, because it describes a bug in how the engine was configured or driven rather
/// than an HTTP-mappable outcome. The [`crate::server::Server`] converts any
/// `RipcoreError` it catches into a 500 [`HttpError`] before handing it to the
/// unhandled-exception hook.
#[derive(Debug, PartialEq, Eq)]
pub struct RipcoreError {
    /// The category of the error.
    pub kind: RipcoreErrorKind,
    /// A human-readable description.
    pub message: String,
}

impl RipcoreError {
    /// Creates a new `RipcoreError`.
    pub fn new<T: Into<String>>(kind: RipcoreErrorKind, message: T) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for [`RipcoreErrorKind::InvalidArgument`].
    pub fn invalid_argument<T: Into<String>>(message: T) -> Self {
        Self::new(RipcoreErrorKind::InvalidArgument, message)
    }

    /// Shorthand for [`RipcoreErrorKind::InvariantViolation`].
    pub fn invariant_violation<T: Into<String>>(message: T) -> Self {
        Self::new(RipcoreErrorKind::InvariantViolation, message)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> &RipcoreErrorKind {
        &self.kind
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for RipcoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RipcoreError {}

impl From<std::io::Error> for RipcoreError {
    fn from(err: std::io::Error) -> Self {
        Self::new(RipcoreErrorKind::IO, err.to_string())
    }
}

/// Carries an HTTP status + reason + diagnostic message, and is promoted to a response
/// through the unhandled-exception hook rather than rendered directly by any component
/// that catches it.
///
/// Mirrors spec §4.4: defaults are `code=500`, `reason="Internal Server Error"`,
/// `error_type="WEB_EXCEPTION"`, `origin="web_function"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    error_type: String,
    origin: String,
    code: u16,
    reason: String,
}

impl HttpError {
    /// `(message)` overload: all other fields take their defaults.
    pub fn new<T: Into<String>>(message: T) -> Self {
        Self {
            message: message.into(),
            error_type: "WEB_EXCEPTION".to_string(),
            origin: "web_function".to_string(),
            code: 500,
            reason: "Internal Server Error".to_string(),
        }
    }

    /// `(message, code, reason)` overload.
    pub fn with_status<T: Into<String>, R: Into<String>>(message: T, code: u16, reason: R) -> Self {
        Self {
            code,
            reason: reason.into(),
            ..Self::new(message)
        }
    }

    /// `(message, type, origin)` overload.
    pub fn with_origin<T, Ty, O>(message: T, error_type: Ty, origin: O) -> Self
    where
        T: Into<String>,
        Ty: Into<String>,
        O: Into<String>,
    {
        Self {
            error_type: error_type.into(),
            origin: origin.into(),
            ..Self::new(message)
        }
    }

    /// `(message, type, origin, code, reason)` overload — the fully specified form.
    pub fn full<T, Ty, O, R>(message: T, error_type: Ty, origin: O, code: u16, reason: R) -> Self
    where
        T: Into<String>,
        Ty: Into<String>,
        O: Into<String>,
        R: Into<String>,
    {
        Self {
            message: message.into(),
            error_type: error_type.into(),
            origin: origin.into(),
            code,
            reason: reason.into(),
        }
    }

    /// The HTTP status code to render.
    pub fn code(&self) -> u16 {
        self.code
    }

    /// The HTTP reason phrase to render.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The diagnostic message (not sent to the client by default).
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The free-form diagnostic type tag.
    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    /// The free-form origin tag.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Formats `Web Exception [<code> - <reason>]: <message>`.
    pub fn diagnostic(&self) -> String {
        format!(
            "Web Exception [{} - {}]: {}",
            self.code, self.reason, self.message
        )
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.diagnostic())
    }
}

impl std::error::Error for HttpError {}

impl From<RipcoreError> for HttpError {
    fn from(err: RipcoreError) -> Self {
        HttpError::with_origin(err.message, "INTERNAL_ERROR", err.kind.to_string())
    }
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::with_origin(err.to_string(), "IO_ERROR", "static_files")
    }
}
