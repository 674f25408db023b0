//! Full list export: metadata, paging, layout choice, composition, emission.

use super::ListExporter;
use crate::compose::{compose_qna, compose_table, wrap};
use crate::eligibility::is_qna_eligible;
use crate::error::Result;
use crate::metadata;
use crate::pager::RecordPager;
use crate::query::ItemQuery;
use crate::sink::{DocumentSink, FileSink};
use crate::types::{ExportedDocument, Layout};
use tracing::{debug, info, warn};

impl ListExporter {
    /// Build the document of the configured list without emitting it
    ///
    /// # Errors
    /// Returns error if field metadata cannot be resolved or the view names a
    /// field the list does not define. Failed item pages are not errors; their
    /// records are dropped and counted in [`ExportedDocument::failed_pages`].
    pub async fn build_document(&self) -> Result<ExportedDocument> {
        self.build_document_for(&self.config.list_title, self.config.view_id.as_deref())
            .await
    }

    /// Build the document of any list of the store, optionally for an explicit view
    pub async fn build_document_for(
        &self,
        list: &str,
        view_id: Option<&str>,
    ) -> Result<ExportedDocument> {
        info!(list, view_id = ?view_id, "starting export");

        let resolved = metadata::resolve(self.store.as_ref(), list, view_id).await?;
        let fields = resolved.require_complete()?;

        let query = ItemQuery::from_descriptors(&fields);
        let fetch = RecordPager::new(self.store.as_ref())
            .with_page_size(self.config.store.page_size)
            .with_max_pages(self.config.store.max_pages)
            .fetch_pages(list, &query)
            .await;
        let failed_pages = fetch.failed_pages();
        let export = fetch.into_export_result();

        let layout = self.choose_layout(is_qna_eligible(&resolved.view_fields, &fields));
        debug!(list, %layout, records = export.items.len(), "composing document");

        let body = match layout {
            Layout::Table => compose_table(&fields, &export, &self.formatter),
            Layout::QnA => compose_qna(&resolved.view_fields, &export),
        };
        let content = wrap(&export.list_title, &body);

        if failed_pages > 0 {
            warn!(
                list,
                failed_pages, "export is partial, records of failed pages were dropped"
            );
        }

        let mut document = ExportedDocument::new(list, content, layout, export.items.len());
        document.failed_pages = failed_pages;
        Ok(document)
    }

    /// Export the configured list and hand the document to `sink`
    ///
    /// # Errors
    /// Returns error if the document cannot be built or the sink refuses it
    pub async fn export(&self, sink: &dyn DocumentSink) -> Result<ExportedDocument> {
        let document = self.build_document().await?;
        emit(sink, &document)?;
        Ok(document)
    }

    /// Export the configured list into the configured output directory
    ///
    /// # Errors
    /// Returns error if the document cannot be built or written
    pub async fn export_to_output_dir(&self) -> Result<ExportedDocument> {
        let sink = FileSink::new(self.config.output_dir.clone());
        self.export(&sink).await
    }
}

/// Hand a finished document to a sink
pub(crate) fn emit(sink: &dyn DocumentSink, document: &ExportedDocument) -> Result<()> {
    sink.emit(&document.file_name, document.content.as_bytes())?;
    info!(
        file = %document.file_name,
        layout = %document.layout,
        records = document.record_count,
        "document emitted"
    );
    Ok(())
}
