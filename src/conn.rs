//! The connection contract and its traced wrapper.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::TracingConfig;
use crate::context::{CallContext, QueryText};
use crate::error::Error;
use crate::stmt::{Statement, TracedStatement};
use crate::tracer::{Tracer, TracerContext};
use crate::tx::{TracedTransaction, Transaction};
use crate::value::{named_values_to_values, ExecResult, NamedValue, Rows, TxOptions, Value};

/// Optional capabilities a [`Connection`] may provide beyond the required
/// prepare/begin/close surface.
///
/// Every flag has a matching trait method with a default implementation
/// returning [`Error::Unsupported`], so a capability check always has a
/// defined fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnCapabilities {
    pub exec: bool,
    pub query: bool,
    pub exec_context: bool,
    pub query_context: bool,
    pub prepare_context: bool,
    pub begin_tx: bool,
    pub ping: bool,
}

impl ConnCapabilities {
    /// No optional capabilities.
    pub const NONE: Self = Self {
        exec: false,
        query: false,
        exec_context: false,
        query_context: false,
        prepare_context: false,
        begin_tx: false,
        ping: false,
    };

    /// Every optional capability.
    pub const ALL: Self = Self {
        exec: true,
        query: true,
        exec_context: true,
        query_context: true,
        prepare_context: true,
        begin_tx: true,
        ping: true,
    };
}

/// A database connection.
///
/// `prepare`, `begin`, and `close` are required. Everything else is an
/// optional capability: a driver advertises what it supports through
/// [`capabilities`](Connection::capabilities) and overrides the matching
/// methods. Callers (including the traced wrapper) check the descriptor
/// before use and fall back, or surface [`Error::Unsupported`], when a
/// capability is absent.
#[async_trait]
pub trait Connection: Send {
    /// Prepare a statement for later execution.
    async fn prepare(&mut self, query: &str) -> Result<Box<dyn Statement>, Error>;

    /// Begin a transaction with default options.
    async fn begin(&mut self) -> Result<Box<dyn Transaction>, Error>;

    /// Close the connection.
    async fn close(&mut self) -> Result<(), Error>;

    /// The optional capabilities this connection provides.
    fn capabilities(&self) -> ConnCapabilities {
        ConnCapabilities::NONE
    }

    /// Execute a query without a call context (legacy positional form).
    async fn exec(&mut self, _query: &str, _args: &[Value]) -> Result<ExecResult, Error> {
        Err(Error::Unsupported)
    }

    /// Run a query without a call context (legacy positional form).
    async fn query(&mut self, _query: &str, _args: &[Value]) -> Result<Box<dyn Rows>, Error> {
        Err(Error::Unsupported)
    }

    /// Execute a query with a call context and named arguments.
    async fn exec_context(
        &mut self,
        _cx: &CallContext,
        _query: &str,
        _args: &[NamedValue],
    ) -> Result<ExecResult, Error> {
        Err(Error::Unsupported)
    }

    /// Run a query with a call context and named arguments.
    async fn query_context(
        &mut self,
        _cx: &CallContext,
        _query: &str,
        _args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, Error> {
        Err(Error::Unsupported)
    }

    /// Prepare a statement with a call context.
    async fn prepare_context(
        &mut self,
        _cx: &CallContext,
        _query: &str,
    ) -> Result<Box<dyn Statement>, Error> {
        Err(Error::Unsupported)
    }

    /// Begin a transaction with explicit options.
    async fn begin_tx(
        &mut self,
        _cx: &CallContext,
        _opts: TxOptions,
    ) -> Result<Box<dyn Transaction>, Error> {
        Err(Error::Unsupported)
    }

    /// Check the connection is alive.
    async fn ping(&mut self, _cx: &CallContext) -> Result<(), Error> {
        Err(Error::Unsupported)
    }
}

/// A traced wrapper around a [`Connection`].
///
/// Context-aware execute/query calls, pings, and options-bearing transaction
/// begins produce spans; everything else delegates untouched. Results and
/// errors from the underlying connection are returned verbatim.
pub struct TracedConnection {
    inner: Box<dyn Connection>,
    tracer: Arc<TracerContext>,
}

impl TracedConnection {
    /// Wrap a single connection with its own tracing backend and
    /// configuration.
    pub fn new(inner: Box<dyn Connection>, tracer: Arc<dyn Tracer>, config: TracingConfig) -> Self {
        Self::with_context(inner, Arc::new(TracerContext::new(tracer, config)))
    }

    pub(crate) fn with_context(inner: Box<dyn Connection>, tracer: Arc<TracerContext>) -> Self {
        Self { inner, tracer }
    }

    /// Delegate an execute, preferring the context-aware capability and
    /// falling back to the positional form.
    async fn dispatch_exec(
        &mut self,
        cx: &CallContext,
        query: &str,
        args: &[NamedValue],
    ) -> Result<ExecResult, Error> {
        if self.inner.capabilities().exec_context {
            return self.inner.exec_context(cx, query, args).await;
        }
        let values = named_values_to_values(args)?;
        self.exec(query, &values).await
    }

    /// Delegate a query, preferring the context-aware capability and falling
    /// back to the positional form.
    async fn dispatch_query(
        &mut self,
        cx: &CallContext,
        query: &str,
        args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, Error> {
        if self.inner.capabilities().query_context {
            return self.inner.query_context(cx, query, args).await;
        }
        let values = named_values_to_values(args)?;
        self.query(query, &values).await
    }
}

#[async_trait]
impl Connection for TracedConnection {
    /// Prepare without tracing; the wrapped statement traces its own
    /// context-aware calls.
    async fn prepare(&mut self, query: &str) -> Result<Box<dyn Statement>, Error> {
        let stmt = self.inner.prepare(query).await?;
        Ok(Box::new(TracedStatement::with_context(
            stmt,
            query,
            Arc::clone(&self.tracer),
        )))
    }

    /// Begin without tracing; the resulting transaction has no span to
    /// finish.
    async fn begin(&mut self) -> Result<Box<dyn Transaction>, Error> {
        let tx = self.inner.begin().await?;
        Ok(Box::new(TracedTransaction::new(tx)))
    }

    async fn close(&mut self) -> Result<(), Error> {
        self.inner.close().await
    }

    /// The wrapper exposes the full capability surface; calls requiring a
    /// capability the underlying connection lacks surface
    /// [`Error::Unsupported`].
    fn capabilities(&self) -> ConnCapabilities {
        ConnCapabilities::ALL
    }

    async fn exec(&mut self, query: &str, args: &[Value]) -> Result<ExecResult, Error> {
        if !self.inner.capabilities().exec {
            return Err(Error::Unsupported);
        }
        self.inner.exec(query, args).await
    }

    async fn query(&mut self, query: &str, args: &[Value]) -> Result<Box<dyn Rows>, Error> {
        if !self.inner.capabilities().query {
            return Err(Error::Unsupported);
        }
        self.inner.query(query, args).await
    }

    async fn exec_context(
        &mut self,
        cx: &CallContext,
        query: &str,
        args: &[NamedValue],
    ) -> Result<ExecResult, Error> {
        let cx = cx.clone().with_value(QueryText(query.to_owned()));
        let span = self.tracer.new_span(&cx);
        self.tracer.tag_statement(span.as_ref(), query);
        let result = self.dispatch_exec(&cx, query, args).await;
        span.finish();
        result
    }

    async fn query_context(
        &mut self,
        cx: &CallContext,
        query: &str,
        args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, Error> {
        let cx = cx.clone().with_value(QueryText(query.to_owned()));
        let span = self.tracer.new_span(&cx);
        self.tracer.tag_statement(span.as_ref(), query);
        let result = self.dispatch_query(&cx, query, args).await;
        span.finish();
        result
    }

    /// Prepare with a call context when supported, falling back to the
    /// context-free form. No span either way.
    async fn prepare_context(
        &mut self,
        cx: &CallContext,
        query: &str,
    ) -> Result<Box<dyn Statement>, Error> {
        let stmt = if self.inner.capabilities().prepare_context {
            self.inner.prepare_context(cx, query).await?
        } else {
            self.inner.prepare(query).await?
        };
        Ok(Box::new(TracedStatement::with_context(
            stmt,
            query,
            Arc::clone(&self.tracer),
        )))
    }

    /// Begin with options, attaching a span that the transaction finishes on
    /// commit or rollback.
    ///
    /// When the underlying connection lacks the capability this falls back to
    /// a plain [`begin`](Connection::begin): the options are dropped and no
    /// span is opened. That asymmetry is a compatibility affordance kept
    /// intact on purpose.
    async fn begin_tx(
        &mut self,
        cx: &CallContext,
        opts: TxOptions,
    ) -> Result<Box<dyn Transaction>, Error> {
        if !self.inner.capabilities().begin_tx {
            return self.begin().await;
        }
        let span = self.tracer.new_span(cx);
        match self.inner.begin_tx(cx, opts).await {
            Ok(tx) => Ok(Box::new(TracedTransaction::with_span(tx, span))),
            Err(err) => {
                span.finish();
                Err(err)
            }
        }
    }

    /// Ping with a span around the delegated call; unsupported pings create
    /// no span since no operation occurs.
    async fn ping(&mut self, cx: &CallContext) -> Result<(), Error> {
        if !self.inner.capabilities().ping {
            return Err(Error::Unsupported);
        }
        let span = self.tracer.new_span(cx);
        let result = self.inner.ping(cx).await;
        span.finish();
        result
    }
}
