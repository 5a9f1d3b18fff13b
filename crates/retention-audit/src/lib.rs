//! Deletion audit log for container-image retention.
//!
//! Every retention decision that removes a tag (or would remove it, in dry-run
//! mode) produces one [`DeletionRecord`], appended to an [`AuditSink`].
//!
//! # Sinks
//!
//! - [`CsvFileSink`]: append-only CSV file, header written once on creation
//! - [`InMemorySink`]: keeps records in memory, for tests
//!
//! # Example
//!
//! ```rust
//! use retention_audit::{AuditSink, DeletionRecord, InMemorySink};
//!
//! let sink = InMemorySink::new();
//! let record = DeletionRecord::new("docker-hosted", "prod-app", "v1", "c-1", "prod", true);
//! sink.append(&record).unwrap();
//!
//! assert_eq!(sink.records().len(), 1);
//! ```

mod error;
mod record;
mod sink;

pub use error::AuditError;
pub use record::{DeletionRecord, CSV_HEADER};
pub use sink::{AuditSink, CsvFileSink, InMemorySink};
