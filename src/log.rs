//! The logger contract this engine consumes, and a default implementation built on
//! `tracing`. A logger is load-bearing for this engine's failure model, so it is an
//! unconditional dependency rather than feature-gated.

/// Five level entry points, thread-safe, and safe to call from any worker thread. The
/// engine itself only ever calls `info` and `error`, but the full set is exposed so a
/// `Logger` can double as the application's general-purpose logger.
pub trait Logger: Send + Sync {
    /// Informational, expected-path logging.
    fn info(&self, message: &str);
    /// A failure worth surfacing — the engine calls this from its catch-log-rethrow
    /// and catch-and-render paths.
    fn error(&self, message: &str);
    /// Verbose diagnostic logging, off by default in most implementations.
    fn debug(&self, message: &str);
    /// Very verbose, per-request tracing.
    fn trace(&self, message: &str);
    /// An error severe enough that the process is expected to exit shortly after.
    fn fatal(&self, message: &str);
}

/// The default [`Logger`], forwarding to the `tracing` crate's global subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }

    fn trace(&self, message: &str) {
        tracing::trace!("{message}");
    }

    fn fatal(&self, message: &str) {
        tracing::error!(fatal = true, "{message}");
    }
}

/// A [`Logger`] that discards everything. Useful in tests that don't want to assert on
/// log output or install a subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn info(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn debug(&self, _message: &str) {}
    fn trace(&self, _message: &str) {}
    fn fatal(&self, _message: &str) {}
}
