//! Audit sink implementations.

use std::fmt::Debug;
use std::fs::{File, OpenOptions};
use std::path::Path;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::AuditError;
use crate::record::{DeletionRecord, CSV_HEADER};

/// Destination for deletion records.
///
/// Implementations must serialize concurrent appends so records are never
/// interleaved.
pub trait AuditSink: Send + Sync + Debug {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    fn append(&self, record: &DeletionRecord) -> Result<(), AuditError>;

    /// Returns the sink name for identification.
    fn name(&self) -> &'static str;
}

/// Append-only CSV file sink.
///
/// The header row is written when the file is created or found empty. Each
/// append holds the lock for the duration of one write and flush.
#[derive(Debug)]
pub struct CsvFileSink {
    writer: Mutex<csv::Writer<File>>,
}

impl CsvFileSink {
    /// Opens (or creates) the log file at `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the header cannot be
    /// written.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        let open_error = |source: std::io::Error| AuditError::Open {
            path: path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_error)?;
        let is_new = file.metadata().map_err(open_error)?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            writer.write_record(CSV_HEADER)?;
            writer.flush()?;
            debug!(path = %path.display(), "Created audit log");
        }

        Ok(Self {
            writer: Mutex::new(writer),
        })
    }
}

impl AuditSink for CsvFileSink {
    fn append(&self, record: &DeletionRecord) -> Result<(), AuditError> {
        let mut writer = self.writer.lock();
        writer.write_record(record.to_row())?;
        writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "csv_file"
    }
}

/// In-memory sink for testing.
#[derive(Debug, Default)]
pub struct InMemorySink {
    records: Mutex<Vec<DeletionRecord>>,
}

impl InMemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all appended records, in append order.
    #[must_use]
    pub fn records(&self) -> Vec<DeletionRecord> {
        self.records.lock().clone()
    }

    /// Clears all records.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl AuditSink for InMemorySink {
    fn append(&self, record: &DeletionRecord) -> Result<(), AuditError> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
