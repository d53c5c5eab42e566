//! Shared test doubles: a recording tracer and a mock driver stack with a
//! settable capability surface.

use std::any::Any;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::TracingConfig;
use crate::conn::{ConnCapabilities, Connection, TracedConnection};
use crate::context::CallContext;
use crate::driver::Driver;
use crate::error::{BoxError, Error};
use crate::stmt::{Statement, StmtCapabilities};
use crate::tracer::{Span, Tracer, TracerContext};
use crate::tx::Transaction;
use crate::value::{ExecResult, NamedValue, Rows, TxOptions, Value};

/// Wrap a mock connection the way `TracedDriver::open` would.
pub fn traced_conn(
    conn: MockConn,
    tracer: Arc<RecordingTracer>,
    config: TracingConfig,
) -> TracedConnection {
    TracedConnection::with_context(Box::new(conn), Arc::new(TracerContext::new(tracer, config)))
}

#[derive(Debug, Clone, Default)]
pub struct SpanRecord {
    pub name: String,
    pub tags: Vec<(String, String)>,
    pub finish_count: usize,
    pub has_parent: bool,
}

pub struct RecordingSpan {
    record: Arc<Mutex<SpanRecord>>,
}

impl Span for RecordingSpan {
    fn set_tag(&self, key: &str, value: &str) {
        self.record
            .lock()
            .unwrap()
            .tags
            .push((key.to_owned(), value.to_owned()));
    }

    fn finish(self: Box<Self>) {
        self.record.lock().unwrap().finish_count += 1;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A tracer that keeps every span it creates inspectable after the fact.
#[derive(Default)]
pub struct RecordingTracer {
    spans: Mutex<Vec<Arc<Mutex<SpanRecord>>>>,
    fail: bool,
}

impl RecordingTracer {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A tracer whose `start_span` always fails.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            spans: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn span_count(&self) -> usize {
        self.spans.lock().unwrap().len()
    }

    /// Snapshot of the `i`-th span created.
    pub fn span(&self, i: usize) -> SpanRecord {
        self.spans.lock().unwrap()[i].lock().unwrap().clone()
    }
}

impl Tracer for RecordingTracer {
    fn start_span(&self, name: &str, parent: Option<&dyn Span>) -> Result<Box<dyn Span>, BoxError> {
        if self.fail {
            return Err("tracer backend offline".into());
        }
        let record = Arc::new(Mutex::new(SpanRecord {
            name: name.to_owned(),
            has_parent: parent.is_some(),
            ..SpanRecord::default()
        }));
        self.spans.lock().unwrap().push(Arc::clone(&record));
        Ok(Box::new(RecordingSpan { record }))
    }
}

/// Chronological log of calls reaching the mock driver objects.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

fn boom() -> Error {
    Error::driver("mock failure")
}

pub struct MockDriver {
    caps: ConnCapabilities,
    log: CallLog,
    fail_open: bool,
}

impl MockDriver {
    pub fn new(caps: ConnCapabilities, log: CallLog) -> Self {
        Self {
            caps,
            log,
            fail_open: false,
        }
    }

    pub fn failing(log: CallLog) -> Self {
        Self {
            caps: ConnCapabilities::ALL,
            log,
            fail_open: true,
        }
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn open(&self, name: &str) -> Result<Box<dyn Connection>, Error> {
        if self.fail_open {
            return Err(boom());
        }
        self.log.push(format!("open {name}"));
        Ok(Box::new(MockConn::new(self.caps, self.log.clone())))
    }
}

/// A mock connection whose optional capability surface is set per test.
pub struct MockConn {
    caps: ConnCapabilities,
    stmt_caps: StmtCapabilities,
    log: CallLog,
    fail: bool,
    fail_statements: bool,
}

impl MockConn {
    pub fn new(caps: ConnCapabilities, log: CallLog) -> Self {
        Self {
            caps,
            stmt_caps: StmtCapabilities::NONE,
            log,
            fail: false,
            fail_statements: false,
        }
    }

    /// Make every connection operation fail with a driver error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Capabilities for statements prepared on this connection.
    pub fn with_stmt_capabilities(mut self, caps: StmtCapabilities) -> Self {
        self.stmt_caps = caps;
        self
    }

    /// Make every statement operation fail with a driver error.
    pub fn failing_statements(mut self) -> Self {
        self.fail_statements = true;
        self
    }

    fn check(&self) -> Result<(), Error> {
        if self.fail {
            Err(boom())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Connection for MockConn {
    async fn prepare(&mut self, query: &str) -> Result<Box<dyn Statement>, Error> {
        self.check()?;
        self.log.push(format!("prepare {query}"));
        Ok(Box::new(MockStmt {
            caps: self.stmt_caps,
            log: self.log.clone(),
            fail: self.fail_statements,
        }))
    }

    async fn begin(&mut self) -> Result<Box<dyn Transaction>, Error> {
        self.check()?;
        self.log.push("begin");
        Ok(Box::new(MockTx::new(self.log.clone())))
    }

    async fn close(&mut self) -> Result<(), Error> {
        self.check()?;
        self.log.push("close");
        Ok(())
    }

    fn capabilities(&self) -> ConnCapabilities {
        self.caps
    }

    async fn exec(&mut self, query: &str, args: &[Value]) -> Result<ExecResult, Error> {
        self.check()?;
        self.log.push(format!("exec {query} {args:?}"));
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: None,
        })
    }

    async fn query(&mut self, query: &str, args: &[Value]) -> Result<Box<dyn Rows>, Error> {
        self.check()?;
        self.log.push(format!("query {query} {args:?}"));
        Ok(Box::new(MockRows::one_row()))
    }

    async fn exec_context(
        &mut self,
        _cx: &CallContext,
        query: &str,
        _args: &[NamedValue],
    ) -> Result<ExecResult, Error> {
        self.check()?;
        self.log.push(format!("exec_context {query}"));
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: None,
        })
    }

    async fn query_context(
        &mut self,
        _cx: &CallContext,
        query: &str,
        _args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, Error> {
        self.check()?;
        self.log.push(format!("query_context {query}"));
        Ok(Box::new(MockRows::one_row()))
    }

    async fn prepare_context(
        &mut self,
        _cx: &CallContext,
        query: &str,
    ) -> Result<Box<dyn Statement>, Error> {
        self.check()?;
        self.log.push(format!("prepare_context {query}"));
        Ok(Box::new(MockStmt {
            caps: self.stmt_caps,
            log: self.log.clone(),
            fail: self.fail_statements,
        }))
    }

    async fn begin_tx(
        &mut self,
        _cx: &CallContext,
        opts: TxOptions,
    ) -> Result<Box<dyn Transaction>, Error> {
        self.check()?;
        self.log
            .push(format!("begin_tx read_only={}", opts.read_only));
        Ok(Box::new(MockTx::new(self.log.clone())))
    }

    async fn ping(&mut self, _cx: &CallContext) -> Result<(), Error> {
        self.check()?;
        self.log.push("ping");
        Ok(())
    }
}

pub struct MockStmt {
    caps: StmtCapabilities,
    log: CallLog,
    fail: bool,
}

impl MockStmt {
    fn check(&self) -> Result<(), Error> {
        if self.fail {
            Err(boom())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Statement for MockStmt {
    async fn close(&mut self) -> Result<(), Error> {
        self.check()?;
        self.log.push("stmt_close");
        Ok(())
    }

    fn num_input(&self) -> Option<usize> {
        Some(1)
    }

    async fn exec(&mut self, args: &[Value]) -> Result<ExecResult, Error> {
        self.check()?;
        self.log.push(format!("stmt_exec {args:?}"));
        Ok(ExecResult::default())
    }

    async fn query(&mut self, args: &[Value]) -> Result<Box<dyn Rows>, Error> {
        self.check()?;
        self.log.push(format!("stmt_query {args:?}"));
        Ok(Box::new(MockRows::one_row()))
    }

    fn capabilities(&self) -> StmtCapabilities {
        self.caps
    }

    async fn exec_context(
        &mut self,
        _cx: &CallContext,
        args: &[NamedValue],
    ) -> Result<ExecResult, Error> {
        self.check()?;
        let values: Vec<&Value> = args.iter().map(|a| &a.value).collect();
        self.log.push(format!("stmt_exec_context {values:?}"));
        Ok(ExecResult::default())
    }

    async fn query_context(
        &mut self,
        _cx: &CallContext,
        _args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, Error> {
        self.check()?;
        self.log.push("stmt_query_context");
        Ok(Box::new(MockRows::one_row()))
    }
}

pub struct MockTx {
    log: CallLog,
    fail: bool,
}

impl MockTx {
    pub fn new(log: CallLog) -> Self {
        Self { log, fail: false }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl Transaction for MockTx {
    async fn commit(&mut self) -> Result<(), Error> {
        self.log.push("commit");
        if self.fail {
            return Err(boom());
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), Error> {
        self.log.push("rollback");
        if self.fail {
            return Err(boom());
        }
        Ok(())
    }
}

pub struct MockRows {
    rows: Vec<Vec<Value>>,
}

impl MockRows {
    fn one_row() -> Self {
        Self {
            rows: vec![vec![Value::Int(1)]],
        }
    }
}

impl Rows for MockRows {
    fn columns(&self) -> Vec<String> {
        vec!["value".to_string()]
    }

    fn next(&mut self) -> Result<Option<Vec<Value>>, Error> {
        if self.rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.rows.remove(0)))
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
