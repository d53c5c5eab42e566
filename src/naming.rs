//! Span-naming strategies.
//!
//! Two ready-made strategies are provided:
//!
//! - [`default_span_name`] inspects the call stack to recover the wrapper
//!   method that initiated the span (e.g. `TracedConnection::exec_context`).
//!   Best-effort only: symbol resolution depends on the platform and build
//!   settings, and an empty name is returned when no wrapper frame resolves.
//! - [`query_span_name`] parses the SQL attached to the call context into an
//!   `"OPERATION table"` name (e.g. `"SELECT users"`).
//!
//! Any `Fn(&CallContext) -> String` can be supplied instead through
//! [`TracingConfig::with_span_name_func`](crate::TracingConfig::with_span_name_func).

use backtrace::Backtrace;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::context::{CallContext, QueryText};

/// Default span-naming strategy: the wrapper method on the stack.
///
/// Walks the current backtrace for the innermost `TracedConnection` or
/// `TracedStatement` frame and returns `Wrapper::method`. Returns an empty
/// string when stack introspection is unavailable.
pub fn default_span_name(_cx: &CallContext) -> String {
    let trace = Backtrace::new();
    for frame in trace.frames() {
        for symbol in frame.symbols() {
            let Some(name) = symbol.name() else { continue };
            if let Some(method) = wrapper_method(&name.to_string()) {
                return method;
            }
        }
    }
    String::new()
}

/// Extract `Wrapper::method` from a mangled-then-demangled symbol such as
/// `<sql_tracing::conn::TracedConnection as ...>::exec_context::{{closure}}::h1f..`.
fn wrapper_method(symbol: &str) -> Option<String> {
    const WRAPPERS: &[&str] = &["TracedConnection", "TracedStatement"];

    let wrapper = WRAPPERS.iter().copied().find(|name| symbol.contains(name))?;
    let mut tail = &symbol[symbol.find(wrapper)? + wrapper.len()..];
    // Skip past the `as Trait>` part of qualified paths.
    if let Some(pos) = tail.rfind('>') {
        tail = &tail[pos + 1..];
    }
    let method = tail
        .split("::")
        .find(|seg| is_identifier(seg) && !is_symbol_hash(seg))?;
    Some(format!("{wrapper}::{method}"))
}

fn is_identifier(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_symbol_hash(segment: &str) -> bool {
    segment.len() == 17
        && segment.starts_with('h')
        && segment[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// SQL-derived span-naming strategy.
///
/// Reads the [`QueryText`] the wrappers attach to the call context and names
/// the span `"OPERATION table"` (e.g. `"SELECT users"`), or just the
/// operation when no table is detectable. Falls back to
/// [`default_span_name`] when no query text is present (e.g. ping spans).
pub fn query_span_name(cx: &CallContext) -> String {
    match cx.value::<QueryText>() {
        Some(QueryText(sql)) => match extract_table(sql) {
            Some(table) => format!("{} {table}", parse_operation(sql).as_str()),
            None => parse_operation(sql).as_str().to_string(),
        },
        None => default_span_name(cx),
    }
}

/// SQL operation types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlOperation {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    Alter,
    Truncate,
    Begin,
    Commit,
    Rollback,
    Set,
    Other,
}

impl SqlOperation {
    /// Returns the operation as a string suitable for span names.
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlOperation::Select => "SELECT",
            SqlOperation::Insert => "INSERT",
            SqlOperation::Update => "UPDATE",
            SqlOperation::Delete => "DELETE",
            SqlOperation::Create => "CREATE",
            SqlOperation::Drop => "DROP",
            SqlOperation::Alter => "ALTER",
            SqlOperation::Truncate => "TRUNCATE",
            SqlOperation::Begin => "BEGIN",
            SqlOperation::Commit => "COMMIT",
            SqlOperation::Rollback => "ROLLBACK",
            SqlOperation::Set => "SET",
            SqlOperation::Other => "QUERY",
        }
    }
}

impl std::fmt::Display for SqlOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Regex patterns for table extraction (compiled once)
static SELECT_TABLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bFROM\s+[`"\[]?(\w+)[`"\]]?"#).unwrap());

static INSERT_TABLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bINSERT\s+INTO\s+[`"\[]?(\w+)[`"\]]?"#).unwrap());

static UPDATE_TABLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bUPDATE\s+[`"\[]?(\w+)[`"\]]?"#).unwrap());

static DELETE_TABLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bDELETE\s+FROM\s+[`"\[]?(\w+)[`"\]]?"#).unwrap());

static CREATE_TABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bCREATE\s+(?:TEMP(?:ORARY)?\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?[`"\[]?(\w+)[`"\]]?"#)
        .unwrap()
});

static DROP_TABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bDROP\s+TABLE\s+(?:IF\s+EXISTS\s+)?[`"\[]?(\w+)[`"\]]?"#).unwrap()
});

static ALTER_TABLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bALTER\s+TABLE\s+[`"\[]?(\w+)[`"\]]?"#).unwrap());

static TRUNCATE_TABLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bTRUNCATE\s+(?:TABLE\s+)?[`"\[]?(\w+)[`"\]]?"#).unwrap());

/// Parse the SQL operation type from a query string.
pub fn parse_operation(sql: &str) -> SqlOperation {
    let trimmed = sql.trim_start();
    let upper_start: String = trimmed.chars().take(15).collect::<String>().to_uppercase();

    if upper_start.starts_with("SELECT") || upper_start.starts_with("WITH") {
        SqlOperation::Select
    } else if upper_start.starts_with("INSERT") {
        SqlOperation::Insert
    } else if upper_start.starts_with("UPDATE") {
        SqlOperation::Update
    } else if upper_start.starts_with("DELETE") {
        SqlOperation::Delete
    } else if upper_start.starts_with("CREATE") {
        SqlOperation::Create
    } else if upper_start.starts_with("DROP") {
        SqlOperation::Drop
    } else if upper_start.starts_with("ALTER") {
        SqlOperation::Alter
    } else if upper_start.starts_with("TRUNCATE") {
        SqlOperation::Truncate
    } else if upper_start.starts_with("BEGIN") || upper_start.starts_with("START") {
        SqlOperation::Begin
    } else if upper_start.starts_with("COMMIT") {
        SqlOperation::Commit
    } else if upper_start.starts_with("ROLLBACK") {
        SqlOperation::Rollback
    } else if upper_start.starts_with("SET") {
        SqlOperation::Set
    } else {
        SqlOperation::Other
    }
}

/// Extract the primary table name from a SQL query.
///
/// Returns `None` if the table cannot be determined.
pub fn extract_table(sql: &str) -> Option<String> {
    let regex = match parse_operation(sql) {
        SqlOperation::Select => &*SELECT_TABLE_REGEX,
        SqlOperation::Insert => &*INSERT_TABLE_REGEX,
        SqlOperation::Update => &*UPDATE_TABLE_REGEX,
        SqlOperation::Delete => &*DELETE_TABLE_REGEX,
        SqlOperation::Create => &*CREATE_TABLE_REGEX,
        SqlOperation::Drop => &*DROP_TABLE_REGEX,
        SqlOperation::Alter => &*ALTER_TABLE_REGEX,
        SqlOperation::Truncate => &*TRUNCATE_TABLE_REGEX,
        _ => return None,
    };

    regex
        .captures(sql)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}
