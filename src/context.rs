//! Per-call context passed through context-aware driver operations.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::tracer::Span;

/// The query text of the operation a span is being created for.
///
/// The connection and statement wrappers attach this to the context they hand
/// to naming functions and span observers, so custom strategies (such as
/// [`naming::query_span_name`](crate::naming::query_span_name)) can build
/// names from the SQL itself.
#[derive(Debug, Clone)]
pub struct QueryText(pub String);

/// Context accompanying a context-aware driver call.
///
/// Carries an optional active span (spans created for the call become its
/// children) and arbitrary caller-supplied values, keyed by type. Custom
/// span-naming functions and observers can read those values (request ids,
/// tenant names, ...) to enrich spans.
///
/// Cloning is cheap: values are stored behind `Arc`.
#[derive(Clone, Default)]
pub struct CallContext {
    span: Option<Arc<dyn Span>>,
    values: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl CallContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an active span; spans created for calls carrying this context
    /// are started as its children.
    pub fn with_span(mut self, span: Arc<dyn Span>) -> Self {
        self.span = Some(span);
        self
    }

    /// The active span attached to this context, if any.
    pub fn active_span(&self) -> Option<&dyn Span> {
        self.span.as_deref()
    }

    /// Attach a typed value, replacing any previous value of the same type.
    pub fn with_value<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.values.insert(TypeId::of::<T>(), Arc::new(value));
        self
    }

    /// Read a typed value previously attached with [`with_value`].
    ///
    /// [`with_value`]: CallContext::with_value
    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }
}

impl fmt::Debug for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("has_span", &self.span.is_some())
            .field("values", &self.values.len())
            .finish()
    }
}
