use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection};
use walkdir::{DirEntry, WalkDir};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS file (
    path TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    modified INTEGER NOT NULL,
    created INTEGER NOT NULL,
    tags TEXT
)";

const NOTE_EXTENSION: &str = "md";

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("notes folder is not a directory: {0}")]
    NotADirectory(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFile {
    pub path: String,
    pub name: String,
    pub modified: i64,
    pub created: i64,
    pub tags: Vec<String>,
}

pub fn open(db_path: &Path) -> Result<Connection, IndexError> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(db_path)?;
    conn.execute(SCHEMA, [])?;
    Ok(conn)
}

pub fn open_memory() -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open_in_memory()?;
    conn.execute(SCHEMA, [])?;
    Ok(conn)
}

/// Re-indexes every note under `root` into the database at `db_path`.
pub fn rebuild(root: &Path, db_path: &Path) -> Result<usize, IndexError> {
    let files = scan(root)?;
    let mut conn = open(db_path)?;
    replace_all(&mut conn, &files)?;
    tracing::info!(
        target: "recentpick::index",
        root = %root.display(),
        indexed = files.len(),
        "notes index rebuilt"
    );
    Ok(files.len())
}

pub fn scan(root: &Path) -> Result<Vec<IndexedFile>, IndexError> {
    if !root.is_dir() {
        return Err(IndexError::NotADirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(target: "recentpick::index", "skipping entry: {error}");
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_note_extension(entry.path()) {
            continue;
        }
        match index_file(root, entry.path()) {
            Ok(file) => files.push(file),
            Err(error) => tracing::warn!(
                target: "recentpick::index",
                path = %entry.path().display(),
                "skipping note: {error}"
            ),
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

pub fn replace_all(conn: &mut Connection, files: &[IndexedFile]) -> Result<(), rusqlite::Error> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM file", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO file (path, name, modified, created, tags) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for file in files {
            let tags = (!file.tags.is_empty()).then(|| file.tags.join(", "));
            stmt.execute(params![file.path, file.name, file.modified, file.created, tags])?;
        }
    }
    tx.commit()
}

pub fn count(conn: &Connection) -> Result<usize, rusqlite::Error> {
    conn.query_row("SELECT COUNT(*) FROM file", [], |row| row.get::<_, i64>(0))
        .map(|count| count as usize)
}

fn index_file(root: &Path, path: &Path) -> Result<IndexedFile, IndexError> {
    let metadata = fs::metadata(path)?;
    let modified = metadata.modified().map(epoch_secs).unwrap_or(0);
    let created = metadata.created().map(epoch_secs).unwrap_or(modified);
    let content = fs::read_to_string(path).unwrap_or_default();

    let relative = path.strip_prefix(root).unwrap_or(path);
    let relative = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| relative.clone());

    Ok(IndexedFile {
        path: relative,
        name,
        modified,
        created,
        tags: extract_tags(&content),
    })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

fn has_note_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(NOTE_EXTENSION))
        .unwrap_or(false)
}

fn epoch_secs(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Tags from YAML front matter (`tags:` inline or as a list) and `#tag` tokens in the body.
pub fn extract_tags(content: &str) -> Vec<String> {
    let (front_matter, body) = split_front_matter(content);
    let mut tags = Vec::new();

    if let Some(front_matter) = front_matter {
        let mut in_tag_list = false;
        for line in front_matter.lines() {
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix("tags:") {
                let inline = rest.trim().trim_start_matches('[').trim_end_matches(']');
                for tag in inline.split(',') {
                    push_tag(&mut tags, tag);
                }
                in_tag_list = inline.trim().is_empty();
                continue;
            }
            match trimmed.strip_prefix("- ") {
                Some(item) if in_tag_list => push_tag(&mut tags, item),
                _ => in_tag_list = false,
            }
        }
    }

    for token in body.split_whitespace() {
        let Some(rest) = token.strip_prefix('#') else {
            continue;
        };
        let tag: String = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '/'))
            .collect();
        if !tag.chars().all(|c| c.is_ascii_digit()) {
            push_tag(&mut tags, &tag);
        }
    }

    tags
}

fn push_tag(tags: &mut Vec<String>, raw: &str) {
    let tag = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim_start_matches('#');
    if !tag.is_empty() && !tags.iter().any(|existing| existing == tag) {
        tags.push(tag.to_string());
    }
}

fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };
    match rest.find("\n---") {
        Some(end) => {
            let after = &rest[end + 4..];
            let body = after.split_once('\n').map(|(_, body)| body).unwrap_or("");
            (Some(&rest[..end]), body)
        }
        None => (None, content),
    }
}
