//! # export2word
//!
//! Library for exporting SharePoint-style lists into word-processor documents.
//!
//! ## Design Philosophy
//!
//! export2word is designed to be:
//! - **Exhaustive** - Every page of a list is fetched, following continuation tokens
//! - **Resilient** - A failed page drops its own records, never the whole export
//! - **Type-aware** - Values are rendered by the declared field type
//! - **Library-first** - No CLI or UI; documents go to a pluggable [`DocumentSink`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use export2word::{Config, FileSink, ListExporter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::new("https://contoso.sharepoint.com/sites/hr", "FAQ");
//!     config.store.auth_header = Some("Bearer eyJ0eXAi...".to_string());
//!
//!     let exporter = ListExporter::new(config)?;
//!     let document = exporter.export(&FileSink::new("exports")).await?;
//!
//!     if document.is_partial() {
//!         eprintln!("{} pages could not be fetched", document.failed_pages);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Document composition
pub mod compose;
/// Configuration types
pub mod config;
/// Question/answer eligibility
pub mod eligibility;
/// Error types
pub mod error;
/// Export orchestration (decomposed into focused submodules)
pub mod exporter;
/// Field-type-aware value formatting
pub mod format;
/// Field metadata resolution
pub mod metadata;
/// Exhaustive paged retrieval
pub mod pager;
/// Item query construction
pub mod query;
/// Document sinks
pub mod sink;
/// Record store abstraction and implementations
pub mod store;
/// Core types
pub mod types;

// Re-export commonly used types
pub use config::{Config, FormatConfig, LayoutPreference, StoreConfig};
pub use error::{Error, MetadataError, Result};
pub use exporter::ListExporter;
pub use sink::{DataUriSink, DocumentSink, DownloadLink, FileSink, MemorySink};
pub use store::{MemoryPage, MemoryRecordStore, RecordStore, RestRecordStore};
pub use types::{
    ExportResult, ExportedDocument, FieldDescriptor, FieldKind, Layout, RawRecord, RecordPage,
    SelectedField, SelectedRow, SemanticType, ViewFieldOrder,
};
