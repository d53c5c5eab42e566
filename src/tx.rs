//! The transaction contract and its traced wrapper.

use async_trait::async_trait;

use crate::error::Error;
use crate::tracer::Span;

/// An open transaction.
#[async_trait]
pub trait Transaction: Send {
    async fn commit(&mut self) -> Result<(), Error>;
    async fn rollback(&mut self) -> Result<(), Error>;
}

/// A traced wrapper around a [`Transaction`].
///
/// Never creates spans of its own. A span opened by a context-aware begin
/// travels here and is finished on the first of commit or rollback; taking it
/// out of the `Option` guarantees it cannot be finished twice.
pub struct TracedTransaction {
    inner: Box<dyn Transaction>,
    span: Option<Box<dyn Span>>,
}

impl TracedTransaction {
    pub(crate) fn new(inner: Box<dyn Transaction>) -> Self {
        Self { inner, span: None }
    }

    pub(crate) fn with_span(inner: Box<dyn Transaction>, span: Box<dyn Span>) -> Self {
        Self {
            inner,
            span: Some(span),
        }
    }
}

#[async_trait]
impl Transaction for TracedTransaction {
    async fn commit(&mut self) -> Result<(), Error> {
        let result = self.inner.commit().await;
        if let Some(span) = self.span.take() {
            span.finish();
        }
        result
    }

    async fn rollback(&mut self) -> Result<(), Error> {
        let result = self.inner.rollback().await;
        if let Some(span) = self.span.take() {
            span.finish();
        }
        result
    }
}
