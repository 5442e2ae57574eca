//! Reading list storage
//!
//! Records arrive from an extraction pass and are kept in arrival order.
//! No deduplication is done. A list opened from a path is written back as
//! pretty JSON after every change; a batch of records is one change.

pub mod export;
mod writer;

pub use export::{ExportDocument, ExportOptions};
pub use writer::spawn_store_writer;

use crate::error::StorageError;
use crate::extraction::ExtractedRecord;
use chrono::Utc;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Persistent list of extracted records
#[derive(Debug, Default)]
pub struct ReadingList {
    path: Option<PathBuf>,
    records: Vec<ExtractedRecord>,
    export: ExportOptions,
}

impl ReadingList {
    /// A list that lives only in memory
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a list backed by `path`; a missing file is an empty list
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Vec::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                path: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(source) => {
                return Err(StorageError::File {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        debug!("Opened {} with {} records", path.display(), records.len());
        Ok(Self {
            path: Some(path),
            records,
            export: ExportOptions::default(),
        })
    }

    /// Use different export naming
    pub fn with_export_options(mut self, options: ExportOptions) -> Self {
        self.export = options;
        self
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Add a record at the end
    pub fn append(&mut self, record: ExtractedRecord) -> Result<(), StorageError> {
        debug!("Saving {}", record.url);
        self.records.push(record);
        self.persist()
    }

    /// Add several records at the end with a single write
    pub fn append_batch(&mut self, records: Vec<ExtractedRecord>) -> Result<(), StorageError> {
        if records.is_empty() {
            return Ok(());
        }
        debug!("Saving batch of {}", records.len());
        self.records.extend(records);
        self.persist()
    }

    /// All records in arrival order
    pub fn list_all(&self) -> &[ExtractedRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove every record
    pub fn clear(&mut self) -> Result<(), StorageError> {
        info!("Clearing {} records", self.records.len());
        self.records.clear();
        self.persist()
    }

    /// Render the list as a Markdown document
    pub fn export(&self) -> Result<ExportDocument, StorageError> {
        if self.records.is_empty() {
            return Err(StorageError::Empty);
        }
        Ok(export::render(&self.records, &self.export, Utc::now()))
    }

    fn persist(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let file_error = |source| StorageError::File {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(file_error)?;
        }
        let json = serde_json::to_string_pretty(&self.records).map_err(|source| {
            StorageError::Corrupt {
                path: path.display().to_string(),
                source,
            }
        })?;
        fs::write(path, json).map_err(file_error)
    }
}
