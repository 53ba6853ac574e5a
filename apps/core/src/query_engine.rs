use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::Value;

use crate::model::{QueryOutcome, QueryPayload, RawQueryResult};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("{0}")]
    Unavailable(String),
    #[error("query execution failed: {0}")]
    Execution(String),
}

/// Executes free-form query text and returns untyped output.
///
/// `Ok(Err(_))` is a failure the engine described; `Err(_)` means the call
/// itself blew up.
#[async_trait(?Send)]
pub trait QueryEngine {
    fn check_available(&self) -> Result<(), QueryError>;
    async fn query(&self, text: &str) -> Result<QueryOutcome, QueryError>;
}

/// Runs query text as SQL against the notes index.
pub struct SqliteQueryEngine {
    db_path: PathBuf,
}

impl SqliteQueryEngine {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait(?Send)]
impl QueryEngine for SqliteQueryEngine {
    fn check_available(&self) -> Result<(), QueryError> {
        if self.db_path.is_file() {
            return Ok(());
        }
        Err(QueryError::Unavailable(
            "The notes index has not been built yet. Run `recentpick index <folder>` first."
                .to_string(),
        ))
    }

    async fn query(&self, text: &str) -> Result<QueryOutcome, QueryError> {
        let db_path = self.db_path.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || run_query(&db_path, &text))
            .await
            .map_err(|error| QueryError::Execution(error.to_string()))
    }
}

pub fn run_query(db_path: &Path, text: &str) -> QueryOutcome {
    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|error| format!("cannot open index {}: {error}", db_path.display()))?;
    query_connection(&conn, text)
}

pub fn query_connection(conn: &Connection, text: &str) -> QueryOutcome {
    let table = read_table(conn, text).map_err(|error| error.to_string())?;
    Ok(QueryPayload::Table(table))
}

fn read_table(conn: &Connection, text: &str) -> Result<RawQueryResult, rusqlite::Error> {
    let mut stmt = conn.prepare(text)?;
    let headers: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let column_count = headers.len();

    let mut values = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(column_count);
        for index in 0..column_count {
            cells.push(cell_value(row.get_ref(index)?));
        }
        values.push(cells);
    }

    Ok(RawQueryResult { headers, values })
}

fn cell_value(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null | ValueRef::Blob(_) => Value::Null,
        ValueRef::Integer(number) => Value::from(number),
        ValueRef::Real(number) => serde_json::Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}
