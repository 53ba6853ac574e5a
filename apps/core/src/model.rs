use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One selectable file produced by normalizing a query result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub path: String,
    pub date: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl FileRecord {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            date: None,
            tags: None,
        }
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.date = Some(date.to_string());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = Some(tags.iter().map(|tag| tag.to_string()).collect());
        self
    }
}

/// Untyped tabular output of a query. Only header names identify fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQueryResult {
    pub headers: Vec<String>,
    pub values: Vec<Vec<Value>>,
}

impl RawQueryResult {
    pub fn new(headers: &[&str], values: Vec<Vec<Value>>) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            values,
        }
    }
}

/// Successful query output as declared by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryPayload {
    Table(RawQueryResult),
    List { values: Vec<Value> },
    Task { values: Vec<Value> },
}

impl QueryPayload {
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Table(_) => "table",
            Self::List { .. } => "list",
            Self::Task { .. } => "task",
        }
    }
}

/// What the engine hands back: a payload, or a descriptive failure.
pub type QueryOutcome = Result<QueryPayload, String>;
