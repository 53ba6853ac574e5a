//! Turns untyped query output into validated [`FileRecord`]s.
//!
//! Every anomaly becomes a [`Diagnostic`] that is logged and returned in the
//! [`NormalizeReport`]. Nothing here fails: the worst case is an empty list.

use serde_json::Value;

use crate::model::{FileRecord, QueryOutcome, QueryPayload, RawQueryResult};

pub const NAME_COLUMN: &str = "Name";
pub const PATH_COLUMN: &str = "Path";
pub const TAGS_COLUMN: &str = "Tags";
pub const DATE_COLUMN: &str = "Date";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    QueryFailed(String),
    NotTabular(String),
    IgnoredColumn(String),
    MissingNameColumn,
    MissingPathColumn,
    RowDropped { row: usize, reason: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QueryFailed(message) => write!(f, "query failed to execute: {message}"),
            Self::NotTabular(shape) => {
                write!(f, "query produced a '{shape}' result instead of 'table'")
            }
            Self::IgnoredColumn(header) => {
                write!(f, "unknown column '{header}' will be ignored")
            }
            Self::MissingNameColumn => write!(
                f,
                "query must return a column '{NAME_COLUMN}' with the file name"
            ),
            Self::MissingPathColumn => write!(
                f,
                "query returned no '{PATH_COLUMN}' column; rows cannot be opened"
            ),
            Self::RowDropped { row, reason } => write!(f, "row {row} dropped: {reason}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub records: Vec<FileRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Column index for each known field, resolved by header name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldMapping {
    pub name: Option<usize>,
    pub path: Option<usize>,
    pub tags: Option<usize>,
    pub date: Option<usize>,
}

impl FieldMapping {
    /// Scans the headers once. Unknown headers are returned separately.
    pub fn from_headers(headers: &[String]) -> (Self, Vec<String>) {
        let mut mapping = Self::default();
        let mut ignored = Vec::new();

        for (index, header) in headers.iter().enumerate() {
            let slot = match header.as_str() {
                NAME_COLUMN => &mut mapping.name,
                PATH_COLUMN => &mut mapping.path,
                TAGS_COLUMN => &mut mapping.tags,
                DATE_COLUMN => &mut mapping.date,
                _ => {
                    ignored.push(header.clone());
                    continue;
                }
            };
            // First occurrence wins for duplicated headers.
            if slot.is_none() {
                *slot = Some(index);
            }
        }

        (mapping, ignored)
    }
}

pub fn normalize(outcome: QueryOutcome) -> Vec<FileRecord> {
    normalize_with_report(outcome).records
}

pub fn normalize_with_report(outcome: QueryOutcome) -> NormalizeReport {
    let mut report = NormalizeReport::default();

    let table = match outcome {
        Ok(QueryPayload::Table(table)) => table,
        Ok(other) => {
            emit(&mut report, Diagnostic::NotTabular(other.shape().to_string()));
            return report;
        }
        Err(message) => {
            emit(&mut report, Diagnostic::QueryFailed(message));
            return report;
        }
    };

    normalize_table(&table, &mut report);
    report
}

fn normalize_table(table: &RawQueryResult, report: &mut NormalizeReport) {
    let (mapping, ignored) = FieldMapping::from_headers(&table.headers);
    for header in ignored {
        emit(report, Diagnostic::IgnoredColumn(header));
    }

    let Some(name_index) = mapping.name else {
        emit(report, Diagnostic::MissingNameColumn);
        return;
    };
    if mapping.path.is_none() {
        emit(report, Diagnostic::MissingPathColumn);
    }

    for (row_number, row) in table.values.iter().enumerate() {
        match decode_row(row, name_index, &mapping) {
            Ok(record) => report.records.push(record),
            Err(reason) => emit(
                report,
                Diagnostic::RowDropped {
                    row: row_number,
                    reason,
                },
            ),
        }
    }
}

fn decode_row(row: &[Value], name_index: usize, mapping: &FieldMapping) -> Result<FileRecord, String> {
    let name = decode_name(row.get(name_index)).ok_or("name cell is not text")?;
    let path_index = mapping.path.ok_or("no path column")?;
    let path = decode_path(row.get(path_index)).ok_or("path cell is unresolvable")?;
    let tags = mapping.tags.map(|index| decode_tags(row.get(index)));
    let date = mapping.date.and_then(|index| decode_date(row.get(index)));

    Ok(FileRecord {
        name,
        path,
        date,
        tags,
    })
}

fn decode_name(cell: Option<&Value>) -> Option<String> {
    match cell? {
        Value::String(name) if !name.trim().is_empty() => Some(name.clone()),
        _ => None,
    }
}

/// Accepts a plain string or a link object carrying a `path` field.
fn decode_path(cell: Option<&Value>) -> Option<String> {
    let text = match cell? {
        Value::String(path) => path.as_str(),
        Value::Object(link) => link.get("path")?.as_str()?,
        _ => return None,
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Present-but-empty tags become an empty list, never `None`.
fn decode_tags(cell: Option<&Value>) -> Vec<String> {
    match cell {
        Some(Value::Array(items)) => items.iter().filter_map(tag_text).collect(),
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn tag_text(value: &Value) -> Option<String> {
    match value {
        Value::String(tag) if !tag.trim().is_empty() => Some(tag.trim().to_string()),
        _ => None,
    }
}

fn decode_date(cell: Option<&Value>) -> Option<String> {
    match cell? {
        Value::Null => None,
        Value::String(date) => Some(date.clone()),
        other => Some(other.to_string()),
    }
}

fn emit(report: &mut NormalizeReport, diagnostic: Diagnostic) {
    match &diagnostic {
        Diagnostic::IgnoredColumn(_) | Diagnostic::RowDropped { .. } => {
            tracing::warn!(target: "recentpick::normalizer", "{diagnostic}");
        }
        _ => tracing::error!(target: "recentpick::normalizer", "{diagnostic}"),
    }
    report.diagnostics.push(diagnostic);
}
