//! List export orchestration split into focused submodules.
//!
//! The `ListExporter` struct and its methods are organized by path:
//! - [`pipeline`] - Full export: metadata, paging, layout choice, composition
//! - [`selection`] - Export of rows the host already has selected

mod pipeline;
mod selection;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::{Config, LayoutPreference};
use crate::error::Result;
use crate::format::ValueFormatter;
use crate::store::{RecordStore, RestRecordStore};
use crate::types::Layout;
use std::sync::Arc;

/// Exports one list into a word-processor document (cloneable, stateless between exports)
///
/// Every export builds its own page sequence and result, so one exporter may
/// run several exports concurrently.
#[derive(Clone)]
pub struct ListExporter {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Record store the list is read from (trait object for pluggable implementations)
    pub(crate) store: Arc<dyn RecordStore>,
    /// Formatter built once from the format settings
    pub(crate) formatter: ValueFormatter,
}

impl ListExporter {
    /// Create an exporter reading from the configured site over HTTP
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client cannot
    /// be created
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let store = RestRecordStore::new(&config)?;
        Self::with_store(config, Arc::new(store))
    }

    /// Create an exporter reading from an arbitrary record store
    ///
    /// # Errors
    /// Returns error if the configuration is invalid
    pub fn with_store(config: Config, store: Arc<dyn RecordStore>) -> Result<Self> {
        config.validate()?;
        let formatter = ValueFormatter::new(&config.format);
        tracing::debug!(
            list = %config.list_title,
            store = store.name(),
            "list exporter created"
        );
        Ok(Self {
            config: Arc::new(config),
            store,
            formatter,
        })
    }

    /// Current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Formatter used for table values
    pub fn formatter(&self) -> &ValueFormatter {
        &self.formatter
    }

    /// Layout for a record set, given whether it qualifies for question/answer layout
    pub fn choose_layout(&self, qna_eligible: bool) -> Layout {
        match (self.config.layout, qna_eligible) {
            (LayoutPreference::Auto, true) => Layout::QnA,
            _ => Layout::Table,
        }
    }
}
