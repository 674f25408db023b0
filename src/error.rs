//! Error types for export2word
//!
//! This module provides error handling for the export pipeline:
//! - Metadata failures, which abort an export
//! - Page fetch failures, which are recorded on the page and never propagated
//! - Transport, serialization and configuration errors
//! - Machine-readable error codes for callers that report failures

use thiserror::Error;

/// Result type alias for export2word operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for export2word
///
/// Each variant includes enough context to tell which stage of the
/// pipeline failed.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "site_url")
        key: Option<String>,
    },

    /// Field metadata could not be resolved; fatal to the whole export
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// A view field has no matching descriptor in the list's field set
    #[error("data integrity error: view field '{field}' has no descriptor in the list")]
    DataIntegrity {
        /// Internal name of the view field that could not be matched
        field: String,
    },

    /// A single page of records could not be fetched
    ///
    /// Only ever stored as a page's failure detail; the pager never returns it.
    #[error("page {page} fetch failed: {reason}")]
    PageFetch {
        /// 1-based position of the page in the request chain
        page: usize,
        /// The reason the page failed
        reason: String,
    },

    /// Remote service answered with a non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document sink refused the document
    #[error("document sink error: {0}")]
    Sink(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Metadata resolution errors
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Failed to read the list's default view
    #[error("failed to get default view of list '{list}': {reason}")]
    DefaultView {
        /// List title
        list: String,
        /// The reason the request failed
        reason: String,
    },

    /// Failed to read the field names of a view
    #[error("failed to get fields of view '{view}' in list '{list}': {reason}")]
    ViewFields {
        /// List title
        list: String,
        /// View id or view title
        view: String,
        /// The reason the request failed
        reason: String,
    },

    /// Failed to read the list's field descriptors
    #[error("failed to get fields of list '{list}': {reason}")]
    ListFields {
        /// List title
        list: String,
        /// The reason the request failed
        reason: String,
    },

    /// A field descriptor could not be turned into a typed descriptor
    #[error("invalid descriptor for field '{field}': {reason}")]
    InvalidDescriptor {
        /// Internal name of the offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

impl Error {
    /// Get the machine-readable error code
    pub fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Metadata(e) => match e {
                MetadataError::DefaultView { .. } => "default_view_failed",
                MetadataError::ViewFields { .. } => "view_fields_failed",
                MetadataError::ListFields { .. } => "list_fields_failed",
                MetadataError::InvalidDescriptor { .. } => "invalid_descriptor",
            },
            Error::DataIntegrity { .. } => "data_integrity",
            Error::PageFetch { .. } => "page_fetch_failed",
            Error::Http { .. } => "http_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::Io(_) => "io_error",
            Error::Sink(_) => "sink_error",
            Error::Other(_) => "internal_error",
        }
    }

    /// Whether this error aborts an export
    ///
    /// Page failures are isolated at the page boundary; everything else is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::PageFetch { .. })
    }
}
