//! Export of rows the host already has selected.
//!
//! The rows carry their own fields and values, so neither metadata
//! resolution nor paging is involved, and the layout is always a table.

use super::ListExporter;
use super::pipeline::emit;
use crate::compose::{compose_selection, wrap};
use crate::error::Result;
use crate::sink::DocumentSink;
use crate::types::{ExportedDocument, Layout, SelectedRow};
use tracing::info;

impl ListExporter {
    /// Build the table document of `rows`, titled after the configured list
    pub fn build_selection_document(&self, rows: &[SelectedRow]) -> ExportedDocument {
        let list = &self.config.list_title;
        info!(list = %list, rows = rows.len(), "exporting selected rows");

        let body = compose_selection(rows, &self.formatter);
        ExportedDocument::new(list, wrap(list, &body), Layout::Table, rows.len())
    }

    /// Export `rows` and hand the document to `sink`
    ///
    /// # Errors
    /// Returns error if the sink refuses the document
    pub fn export_selection(
        &self,
        rows: &[SelectedRow],
        sink: &dyn DocumentSink,
    ) -> Result<ExportedDocument> {
        let document = self.build_selection_document(rows);
        emit(sink, &document)?;
        Ok(document)
    }
}
