//! Error types for traced driver operations.

/// A boxed error from an underlying driver or tracing backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the traced driver wrappers.
///
/// Errors produced by the underlying driver are carried in
/// [`Error::Driver`] verbatim: the wrappers never translate, retry, or
/// suppress them, so callers see identical behavior with or without tracing
/// enabled. Tracing backend failures are never surfaced through this type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying driver object does not provide the requested optional
    /// capability.
    #[error("operation unsupported by the underlying driver")]
    Unsupported,

    /// A legacy (non-context) fallback path was required, but the caller
    /// supplied parameters with names, which the positional representation
    /// cannot carry.
    #[error("driver does not support the use of named parameters")]
    NamedParameters,

    /// An error returned by the underlying driver, passed through unchanged.
    #[error("{0}")]
    Driver(BoxError),
}

impl Error {
    /// Wrap an underlying driver error.
    pub fn driver(err: impl Into<BoxError>) -> Self {
        Error::Driver(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_message() {
        assert_eq!(
            Error::Unsupported.to_string(),
            "operation unsupported by the underlying driver"
        );
    }

    #[test]
    fn driver_error_preserves_message() {
        let err = Error::driver("connection reset");
        assert_eq!(err.to_string(), "connection reset");
    }
}
