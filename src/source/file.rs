//! File replay source
//!
//! Serves records captured from a log store as JSON. The layout mirrors
//! the store's hierarchy:
//!
//! ```text
//! {data_dir}/{project}/{log_store}.json
//! ```
//!
//! The file holds an array of flat objects. String values are used as-is;
//! numbers and booleans are rendered to text, nulls are skipped and nested
//! values are kept as compact JSON. The file is re-read on every search so
//! edits show up without a restart.

use super::*;
use std::path::{Path, PathBuf};

/// Log source replaying a captured log store from disk
pub struct FileSource {
    data_dir: PathBuf,
    project: String,
    log_store: String,
}

impl FileSource {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        project: impl Into<String>,
        log_store: impl Into<String>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            project: project.into(),
            log_store: log_store.into(),
        }
    }

    /// Path of the replay file
    pub fn path(&self) -> PathBuf {
        self.data_dir
            .join(&self.project)
            .join(format!("{}.json", self.log_store))
    }

    /// Read and decode every record in the replay file
    pub async fn load(&self) -> SourceResult<Vec<RawRecord>> {
        let path = self.path();
        if !path.exists() {
            return Err(self.not_found());
        }

        let bytes = tokio::fs::read(&path).await?;
        decode_records(&bytes)
    }

    fn not_found(&self) -> SourceError {
        SourceError::NotFound(format!("{}/{}", self.project, self.log_store))
    }
}

/// Decode a JSON array of flat objects into raw records
pub fn decode_records(bytes: &[u8]) -> SourceResult<Vec<RawRecord>> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_slice(bytes)?;

    Ok(rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .filter_map(|(name, value)| render_value(value).map(|text| (name, text)))
                .collect()
        })
        .collect())
}

fn render_value(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        nested => Some(nested.to_string()),
    }
}

/// Write records to a replay file, creating parent directories
pub async fn write_records(path: &Path, records: &[RawRecord]) -> SourceResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(records)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

#[async_trait]
impl LogSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_logs(&self, search: &LogSearch) -> SourceResult<LogBatch> {
        let records = self.load().await?;
        let batch = select_records(&records, search);

        tracing::debug!(
            path = %self.path().display(),
            total = records.len(),
            returned = batch.count,
            complete = batch.complete,
            "Served records from replay file"
        );

        Ok(batch)
    }

    async fn check_health(&self) -> SourceResult<()> {
        if self.path().is_file() {
            Ok(())
        } else {
            Err(self.not_found())
        }
    }
}
