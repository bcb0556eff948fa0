//! Listing record sources.
//!
//! Every source yields the same shape: a list of untyped field maps. Read
//! failures are reported as [`Error::SourceUnavailable`] so a page never
//! renders from a half-read dataset.

use condo_core::{Error, RawRecord, Result};
use duckdb::Connection;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Field stripped from document-store exports.
const DOCUMENT_ID_FIELD: &str = "_id";

/// A source of raw listing records.
pub trait RecordSource {
    /// Stable identity used as the cache key.
    fn source_id(&self) -> String;

    /// Read the full snapshot.
    fn load(&self) -> Result<Vec<RawRecord>>;
}

/// Flat CSV file with a header row, read through an in-memory DuckDB.
///
/// Every column is read as text; typing happens in the normalizer.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(&self) -> duckdb::Result<Vec<RawRecord>> {
        let conn = Connection::open_in_memory()?;
        let escaped = self.path.to_string_lossy().replace('\'', "''");
        let relation = format!("read_csv('{escaped}', header = true, all_varchar = true)");

        let columns: Vec<String> = {
            let mut stmt = conn.prepare(&format!("DESCRIBE SELECT * FROM {relation}"))?;
            let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
            names.collect::<duckdb::Result<Vec<_>>>()?
        };

        let mut stmt = conn.prepare(&format!("SELECT * FROM {relation}"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            let mut record = RawRecord::new();
            for (idx, name) in columns.iter().enumerate() {
                let cell: Option<String> = row.get(idx)?;
                record.insert(name.clone(), cell.map_or(Value::Null, Value::String));
            }
            records.push(record);
        }

        Ok(records)
    }
}

impl RecordSource for CsvFileSource {
    fn source_id(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    fn load(&self) -> Result<Vec<RawRecord>> {
        if !self.path.is_file() {
            return Err(Error::source_unavailable(
                self.source_id(),
                format!("{} is not a readable file", self.path.display()),
            ));
        }

        let records = self
            .read_rows()
            .map_err(|e| Error::source_unavailable(self.source_id(), e))?;
        debug!(source = %self.source_id(), rows = records.len(), "loaded csv");
        Ok(records)
    }
}

/// Document-store export: a JSON array of objects, or one object per line.
#[derive(Debug, Clone)]
pub struct JsonDocumentSource {
    path: PathBuf,
}

impl JsonDocumentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse documents from text: a JSON array, or a stream of objects (one
    /// per line or pretty-printed). Any unparseable input or non-object
    /// document fails the whole parse.
    pub fn parse_documents(text: &str) -> Result<Vec<RawRecord>> {
        let trimmed = text.trim_start();
        let values: Vec<Value> = if trimmed.starts_with('[') {
            serde_json::from_str(trimmed)?
        } else {
            serde_json::Deserializer::from_str(trimmed)
                .into_iter::<Value>()
                .collect::<std::result::Result<Vec<Value>, serde_json::Error>>()?
        };

        values
            .into_iter()
            .enumerate()
            .map(|(idx, value)| match value {
                Value::Object(mut doc) => {
                    doc.remove(DOCUMENT_ID_FIELD);
                    Ok(doc)
                }
                other => Err(Error::data(format!(
                    "document {} is not an object: {other}",
                    idx + 1
                ))),
            })
            .collect()
    }
}

impl RecordSource for JsonDocumentSource {
    fn source_id(&self) -> String {
        format!("json:{}", self.path.display())
    }

    fn load(&self) -> Result<Vec<RawRecord>> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::source_unavailable(self.source_id(), e))?;
        let records = Self::parse_documents(&text)
            .map_err(|e| Error::source_unavailable(self.source_id(), e))?;
        debug!(source = %self.source_id(), documents = records.len(), "loaded documents");
        Ok(records)
    }
}

/// Records already in memory.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    id: String,
    records: Vec<RawRecord>,
}

impl InMemorySource {
    pub fn new(id: impl Into<String>, records: Vec<RawRecord>) -> Self {
        Self {
            id: id.into(),
            records,
        }
    }
}

impl RecordSource for InMemorySource {
    fn source_id(&self) -> String {
        format!("memory:{}", self.id)
    }

    fn load(&self) -> Result<Vec<RawRecord>> {
        Ok(self.records.clone())
    }
}
