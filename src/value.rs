//! Parameter and result types shared across the driver contract.

use crate::error::Error;

/// A query parameter or result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

/// A query parameter carrying an optional name alongside its ordinal
/// position and value.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedValue {
    /// Parameter name; empty or absent for purely positional parameters.
    pub name: Option<String>,
    /// One-based parameter position.
    pub ordinal: usize,
    pub value: Value,
}

impl NamedValue {
    /// A positional parameter with no name.
    pub fn positional(ordinal: usize, value: impl Into<Value>) -> Self {
        Self {
            name: None,
            ordinal,
            value: value.into(),
        }
    }

    /// A named parameter.
    pub fn named(name: impl Into<String>, ordinal: usize, value: impl Into<Value>) -> Self {
        Self {
            name: Some(name.into()),
            ordinal,
            value: value.into(),
        }
    }
}

/// Convert named arguments to the positional form used by legacy
/// (non-context) driver operations.
///
/// Fails with [`Error::NamedParameters`] if any argument carries a non-empty
/// name, since the positional representation cannot express it.
pub fn named_values_to_values(args: &[NamedValue]) -> Result<Vec<Value>, Error> {
    args.iter()
        .map(|arg| {
            if arg.name.as_deref().is_some_and(|name| !name.is_empty()) {
                return Err(Error::NamedParameters);
            }
            Ok(arg.value.clone())
        })
        .collect()
}

/// Outcome of an execute operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
}

/// Transaction isolation levels, matching the usual driver-level set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IsolationLevel {
    #[default]
    Default,
    ReadUncommitted,
    ReadCommitted,
    WriteCommitted,
    RepeatableRead,
    Snapshot,
    Serializable,
    Linearizable,
}

/// Options for a transaction started through a context-aware begin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxOptions {
    pub isolation: IsolationLevel,
    pub read_only: bool,
}

/// A result set returned by a query operation.
///
/// The wrappers pass row sets through untouched; this contract exists only so
/// drivers have a common return type.
pub trait Rows: Send {
    /// Column names, in result order.
    fn columns(&self) -> Vec<String>;

    /// The next row, or `None` once the set is exhausted.
    fn next(&mut self) -> Result<Option<Vec<Value>>, Error>;

    /// Release any resources held by the result set.
    fn close(&mut self) -> Result<(), Error>;
}
