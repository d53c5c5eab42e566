//! The prepared-statement contract and its traced wrapper.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::{CallContext, QueryText};
use crate::error::Error;
use crate::tracer::TracerContext;
use crate::value::{named_values_to_values, ExecResult, NamedValue, Rows, Value};

/// Optional capabilities a [`Statement`] may provide beyond the required
/// close/num-input/exec/query surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StmtCapabilities {
    pub exec_context: bool,
    pub query_context: bool,
}

impl StmtCapabilities {
    /// No optional capabilities.
    pub const NONE: Self = Self {
        exec_context: false,
        query_context: false,
    };

    /// Every optional capability.
    pub const ALL: Self = Self {
        exec_context: true,
        query_context: true,
    };
}

/// A prepared statement.
#[async_trait]
pub trait Statement: Send {
    /// Release the statement.
    async fn close(&mut self) -> Result<(), Error>;

    /// Number of placeholder parameters, or `None` when the driver does not
    /// know.
    fn num_input(&self) -> Option<usize>;

    /// Execute with positional values.
    async fn exec(&mut self, args: &[Value]) -> Result<ExecResult, Error>;

    /// Query with positional values.
    async fn query(&mut self, args: &[Value]) -> Result<Box<dyn Rows>, Error>;

    /// The optional capabilities this statement provides.
    fn capabilities(&self) -> StmtCapabilities {
        StmtCapabilities::NONE
    }

    /// Execute with a call context and named arguments.
    async fn exec_context(
        &mut self,
        _cx: &CallContext,
        _args: &[NamedValue],
    ) -> Result<ExecResult, Error> {
        Err(Error::Unsupported)
    }

    /// Query with a call context and named arguments.
    async fn query_context(
        &mut self,
        _cx: &CallContext,
        _args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, Error> {
        Err(Error::Unsupported)
    }
}

/// A traced wrapper around a [`Statement`].
///
/// Holds the query text it was prepared with, so context-aware executions can
/// tag their spans with it when statement logging is enabled. Context-free
/// calls delegate untouched.
pub struct TracedStatement {
    inner: Box<dyn Statement>,
    query: String,
    tracer: Arc<TracerContext>,
}

impl TracedStatement {
    pub(crate) fn with_context(
        inner: Box<dyn Statement>,
        query: &str,
        tracer: Arc<TracerContext>,
    ) -> Self {
        Self {
            inner,
            query: query.to_owned(),
            tracer,
        }
    }

    async fn dispatch_exec(
        &mut self,
        cx: &CallContext,
        args: &[NamedValue],
    ) -> Result<ExecResult, Error> {
        if self.inner.capabilities().exec_context {
            return self.inner.exec_context(cx, args).await;
        }
        let values = named_values_to_values(args)?;
        self.inner.exec(&values).await
    }

    async fn dispatch_query(
        &mut self,
        cx: &CallContext,
        args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, Error> {
        if self.inner.capabilities().query_context {
            return self.inner.query_context(cx, args).await;
        }
        let values = named_values_to_values(args)?;
        self.inner.query(&values).await
    }
}

#[async_trait]
impl Statement for TracedStatement {
    async fn close(&mut self) -> Result<(), Error> {
        self.inner.close().await
    }

    fn num_input(&self) -> Option<usize> {
        self.inner.num_input()
    }

    async fn exec(&mut self, args: &[Value]) -> Result<ExecResult, Error> {
        self.inner.exec(args).await
    }

    async fn query(&mut self, args: &[Value]) -> Result<Box<dyn Rows>, Error> {
        self.inner.query(args).await
    }

    fn capabilities(&self) -> StmtCapabilities {
        StmtCapabilities::ALL
    }

    async fn exec_context(
        &mut self,
        cx: &CallContext,
        args: &[NamedValue],
    ) -> Result<ExecResult, Error> {
        let cx = cx.clone().with_value(QueryText(self.query.clone()));
        let span = self.tracer.new_span(&cx);
        self.tracer.tag_statement(span.as_ref(), &self.query);
        let result = self.dispatch_exec(&cx, args).await;
        span.finish();
        result
    }

    async fn query_context(
        &mut self,
        cx: &CallContext,
        args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, Error> {
        let cx = cx.clone().with_value(QueryText(self.query.clone()));
        let span = self.tracer.new_span(&cx);
        self.tracer.tag_statement(span.as_ref(), &self.query);
        let result = self.dispatch_query(&cx, args).await;
        span.finish();
        result
    }
}
