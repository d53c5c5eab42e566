//! Configuration for tracing behavior.

use std::fmt;
use std::sync::Arc;

use crate::context::CallContext;
use crate::tracer::Span;

/// Resolves a human-readable operation name for a span being created.
///
/// The call context accompanying the operation is passed through, so custom
/// strategies can read values off it (request ids, the attached
/// [`QueryText`](crate::context::QueryText), ...) to build richer names.
pub type SpanNameFunc = Arc<dyn Fn(&CallContext) -> String + Send + Sync>;

/// Observes every span right after creation, e.g. to attach extra tags.
pub type SpanObserver = Arc<dyn Fn(&CallContext, &dyn Span) + Send + Sync>;

/// Options for a traced driver, applied once at construction.
///
/// # Example
///
/// ```rust
/// use sql_tracing::TracingConfig;
///
/// let config = TracingConfig::default()
///     .with_statement_logging(true)
///     .with_span_name_func(sql_tracing::naming::query_span_name);
/// ```
#[derive(Clone)]
pub struct TracingConfig {
    /// Span-naming strategy. Default: best-effort stack introspection
    /// ([`naming::default_span_name`](crate::naming::default_span_name)).
    pub name_func: Option<SpanNameFunc>,

    /// Callback invoked once per created span.
    /// Default: `None`
    pub observer: Option<SpanObserver>,

    /// Whether to attach the raw query text to spans.
    /// Default: `false` (queries may embed sensitive data)
    pub log_statements: bool,

    /// Tag name used for the query text when statement logging is enabled.
    /// Default: `"db.statement"`
    pub statement_tag: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            name_func: None,
            observer: None,
            log_statements: false,
            statement_tag: "db.statement".to_string(),
        }
    }
}

impl TracingConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom span-naming function.
    pub fn with_span_name_func(
        mut self,
        f: impl Fn(&CallContext) -> String + Send + Sync + 'static,
    ) -> Self {
        self.name_func = Some(Arc::new(f));
        self
    }

    /// Observe every created span, e.g. to add tags from the call context.
    pub fn with_span_observer(
        mut self,
        f: impl Fn(&CallContext, &dyn Span) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Arc::new(f));
        self
    }

    /// Enable or disable attaching the raw query text to spans.
    ///
    /// **Security Warning**: Enabling this may expose sensitive data in your
    /// traces if queries embed credentials or PII in the SQL text itself.
    pub fn with_statement_logging(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    /// Set the tag name used for the query text.
    pub fn with_statement_tag(mut self, tag: impl Into<String>) -> Self {
        self.statement_tag = tag.into();
        self
    }
}

impl fmt::Debug for TracingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingConfig")
            .field("name_func", &self.name_func.is_some())
            .field("observer", &self.observer.is_some())
            .field("log_statements", &self.log_statements)
            .field("statement_tag", &self.statement_tag)
            .finish()
    }
}
