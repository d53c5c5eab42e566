//! # sql-tracing
//!
//! Distributed-tracing instrumentation for SQL database drivers.
//!
//! This crate wraps a database driver so that every context-aware query,
//! statement execution, ping, and options-bearing transaction begin
//! automatically produces a tracing span, without callers changing how they
//! issue queries. The driver and the tracing backend are both consumed
//! through narrow trait contracts, so any driver implementing [`Driver`] and
//! any backend implementing [`Tracer`] can be combined.
//!
//! ## Features
//!
//! - **Transparent Instrumentation**: wrapped connections, statements, and
//!   transactions behave identically to the bare driver; results and errors
//!   pass through verbatim
//! - **Capability-Aware Delegation**: richer driver capabilities
//!   (context-aware execute/query, begin-with-options, ping) are used when
//!   the underlying connection advertises them, with defined fallbacks when
//!   it does not
//! - **Pluggable Naming**: span names come from a configurable strategy; the
//!   default recovers the wrapper method from the call stack, and a
//!   SQL-parsing strategy is included
//! - **Tracing Never Breaks Queries**: backend span-creation failures degrade
//!   to no-op spans and are logged at debug level only
//! - **`tracing` Out of the Box**: [`TracingBackend`] bridges spans onto the
//!   `tracing` crate with OpenTelemetry semantic-convention fields
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sql_tracing::{CallContext, Driver, TracedDriver, TracingBackend, TracingConfig};
//!
//! let driver = TracedDriver::new(
//!     my_driver,
//!     Arc::new(TracingBackend::new()),
//!     TracingConfig::default().with_statement_logging(true),
//! );
//!
//! // Use it exactly like the bare driver; every context-aware call is traced.
//! let mut conn = driver.open("postgres://localhost/mydb").await?;
//! let rows = conn.query_context(&CallContext::new(), "SELECT 1", &[]).await?;
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use sql_tracing::{naming, TracingConfig};
//!
//! let config = TracingConfig::default()
//!     .with_statement_logging(true)             // attach SQL text to spans
//!     .with_statement_tag("db.statement")       // tag name for the SQL text
//!     .with_span_name_func(naming::query_span_name) // "SELECT users"-style names
//!     .with_span_observer(|_cx, span| span.set_tag("component", "sql"));
//! ```
//!
//! ## Span Behavior
//!
//! | Operation | Span |
//! |-----------|------|
//! | `exec_context` / `query_context` (connection or statement) | always; finished before returning |
//! | `ping` | when the connection supports pings |
//! | `begin_tx` | when begin-with-options is supported; finished on the first of commit/rollback |
//! | `open`, `prepare`, `begin`, `close`, context-free `exec`/`query` | never |

mod config;
mod conn;
mod context;
mod driver;
mod error;
pub mod naming;
mod stmt;
mod tracer;
mod tx;
mod value;

#[cfg(test)]
pub(crate) mod test_util;

pub use config::{SpanNameFunc, SpanObserver, TracingConfig};
pub use conn::{ConnCapabilities, Connection, TracedConnection};
pub use context::{CallContext, QueryText};
pub use driver::{Driver, TracedDriver, TracingExt};
pub use error::{BoxError, Error};
pub use stmt::{Statement, StmtCapabilities, TracedStatement};
pub use tracer::{NoopSpan, Span, Tracer, TracingBackend, TracingSpan};
pub use tx::{TracedTransaction, Transaction};
pub use value::{
    named_values_to_values, ExecResult, IsolationLevel, NamedValue, Rows, TxOptions, Value,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CallContext, Connection, Driver, Error, Statement, TracedDriver, TracingBackend,
        TracingConfig, TracingExt, Transaction,
    };
}
