//! Tracing backend contracts and the shared per-driver tracer state.

use std::any::Any;
use std::sync::Arc;

use crate::config::{SpanNameFunc, SpanObserver, TracingConfig};
use crate::context::CallContext;
use crate::error::BoxError;
use crate::naming;

/// One traced operation, as represented by the tracing backend.
///
/// Spans are created by a [`Tracer`] and finished exactly once; `finish`
/// consumes the span so a second finish is unrepresentable.
pub trait Span: Send + Sync {
    /// Attach a named string tag to the span.
    ///
    /// Backends are free to drop tags they cannot represent.
    fn set_tag(&self, key: &str, value: &str);

    /// End the span.
    fn finish(self: Box<Self>);

    /// Backend escape hatch, used for parent-span linkage.
    fn as_any(&self) -> &dyn Any;
}

/// A tracing-span factory.
///
/// Implementations adapt a concrete tracing backend. Failures returned here
/// never reach callers of the traced driver: span creation falls back to a
/// [`NoopSpan`] so tracing can never break query execution.
pub trait Tracer: Send + Sync {
    /// Start a span with the given operation name, optionally as a child of
    /// `parent`.
    fn start_span(&self, name: &str, parent: Option<&dyn Span>) -> Result<Box<dyn Span>, BoxError>;
}

/// A span that records nothing. Used when the backend fails to produce one.
#[derive(Debug, Clone, Copy)]
pub struct NoopSpan;

impl Span for NoopSpan {
    fn set_tag(&self, _key: &str, _value: &str) {}

    fn finish(self: Box<Self>) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Shared tracer state for one traced driver.
///
/// Built once when the driver (or a single connection) is wrapped, then
/// shared by reference with every connection, statement, and transaction
/// derived from it. Read-only after construction, so no locking is needed.
pub(crate) struct TracerContext {
    tracer: Arc<dyn Tracer>,
    name_func: SpanNameFunc,
    observer: Option<SpanObserver>,
    log_statements: bool,
    statement_tag: String,
}

impl TracerContext {
    pub(crate) fn new(tracer: Arc<dyn Tracer>, config: TracingConfig) -> Self {
        Self {
            tracer,
            name_func: config
                .name_func
                .unwrap_or_else(|| Arc::new(naming::default_span_name)),
            observer: config.observer,
            log_statements: config.log_statements,
            statement_tag: config.statement_tag,
        }
    }

    /// Create a span for a context-aware operation.
    ///
    /// The parent, if any, comes from the context. Backend failures degrade
    /// to a [`NoopSpan`] with a debug log; the observer, if configured, is
    /// invoked exactly once with the context and the new span.
    pub(crate) fn new_span(&self, cx: &CallContext) -> Box<dyn Span> {
        let name = (self.name_func)(cx);
        let span = match self.tracer.start_span(&name, cx.active_span()) {
            Ok(span) => span,
            Err(err) => {
                tracing::debug!(error = %err, span = %name, "span creation failed, using no-op span");
                Box::new(NoopSpan)
            }
        };
        if let Some(observer) = &self.observer {
            observer(cx, span.as_ref());
        }
        span
    }

    /// Tag a span with the query text, when statement logging is enabled.
    pub(crate) fn tag_statement(&self, span: &dyn Span, query: &str) {
        if self.log_statements {
            span.set_tag(&self.statement_tag, query);
        }
    }
}

/// Default backend bridging spans onto the [`tracing`] crate.
///
/// Spans are emitted with OpenTelemetry semantic-convention fields. `tracing`
/// requires fields to be declared up front, so tags set through
/// [`Span::set_tag`] are recorded only for the declared set below; anything
/// else is dropped by the subscriber. When no explicit parent is attached to
/// the call context, spans pick up the subscriber's current span as parent,
/// which nests database spans under e.g. HTTP request spans.
///
/// Declared fields: `otel.name`, `db.statement`, `db.system`, `db.operation`,
/// `db.sql.table`, `otel.status_code`, `error.message`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingBackend;

impl TracingBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Tracer for TracingBackend {
    fn start_span(&self, name: &str, parent: Option<&dyn Span>) -> Result<Box<dyn Span>, BoxError> {
        let parent = parent.and_then(|p| p.as_any().downcast_ref::<TracingSpan>());
        let span = match parent {
            Some(parent) => tracing::info_span!(
                parent: &parent.span,
                "db.client",
                otel.name = %name,
                otel.kind = "client",
                db.statement = tracing::field::Empty,
                db.system = tracing::field::Empty,
                db.operation = tracing::field::Empty,
                db.sql.table = tracing::field::Empty,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            ),
            None => tracing::info_span!(
                "db.client",
                otel.name = %name,
                otel.kind = "client",
                db.statement = tracing::field::Empty,
                db.system = tracing::field::Empty,
                db.operation = tracing::field::Empty,
                db.sql.table = tracing::field::Empty,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            ),
        };
        Ok(Box::new(TracingSpan { span }))
    }
}

/// A [`Span`] backed by a [`tracing::Span`].
pub struct TracingSpan {
    span: tracing::Span,
}

impl TracingSpan {
    /// The subscriber's current span, for use as an explicit parent on a
    /// [`CallContext`].
    pub fn current() -> Self {
        Self {
            span: tracing::Span::current(),
        }
    }
}

impl Span for TracingSpan {
    fn set_tag(&self, key: &str, value: &str) {
        // Undeclared fields are dropped by `tracing` itself.
        self.span.record(key, value);
    }

    fn finish(self: Box<Self>) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
}
