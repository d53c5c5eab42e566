//! The driver contract and the top-level traced driver wrapper.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::TracingConfig;
use crate::conn::{Connection, TracedConnection};
use crate::error::Error;
use crate::tracer::{Tracer, TracerContext};

/// A database driver: the entry point that opens connections.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Open a connection to the data source named by `name`.
    async fn open(&self, name: &str) -> Result<Box<dyn Connection>, Error>;
}

/// A driver wrapper that instruments every connection it opens.
///
/// All connections, statements, and transactions derived from this driver
/// share one [`TracingConfig`] and tracing backend, fixed at construction.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use sql_tracing::{TracedDriver, TracingBackend, TracingConfig};
///
/// let driver = TracedDriver::new(
///     PostgresDriver::default(),
///     Arc::new(TracingBackend::new()),
///     TracingConfig::default().with_statement_logging(true),
/// );
/// let mut conn = driver.open("postgres://localhost/mydb").await?;
/// ```
pub struct TracedDriver<D> {
    inner: D,
    tracer: Arc<TracerContext>,
}

impl<D: Driver> TracedDriver<D> {
    /// Wrap a driver with the given tracing backend and configuration.
    pub fn new(driver: D, tracer: Arc<dyn Tracer>, config: TracingConfig) -> Self {
        Self {
            inner: driver,
            tracer: Arc::new(TracerContext::new(tracer, config)),
        }
    }

    /// Get a reference to the underlying driver.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Consume the wrapper and return the underlying driver.
    pub fn into_inner(self) -> D {
        self.inner
    }
}

#[async_trait]
impl<D: Driver> Driver for TracedDriver<D> {
    /// Open a connection and wrap it.
    ///
    /// Opening predates any call context, so no span is created; failures
    /// pass through unchanged.
    async fn open(&self, name: &str) -> Result<Box<dyn Connection>, Error> {
        let conn = self.inner.open(name).await?;
        Ok(Box::new(TracedConnection::with_context(
            conn,
            Arc::clone(&self.tracer),
        )))
    }
}

/// Extension trait for wrapping drivers with tracing instrumentation.
pub trait TracingExt: Driver + Sized {
    /// Wrap this driver with tracing instrumentation and default
    /// configuration.
    fn with_tracing(self, tracer: Arc<dyn Tracer>) -> TracedDriver<Self> {
        TracedDriver::new(self, tracer, TracingConfig::default())
    }

    /// Wrap this driver with tracing instrumentation and a custom
    /// configuration.
    fn with_tracing_config(
        self,
        tracer: Arc<dyn Tracer>,
        config: TracingConfig,
    ) -> TracedDriver<Self> {
        TracedDriver::new(self, tracer, config)
    }
}

impl<D: Driver + Sized> TracingExt for D {}
