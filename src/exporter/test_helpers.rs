//! Shared test helpers for creating ListExporter instances in tests.

use crate::config::Config;
use crate::exporter::ListExporter;
use crate::store::{MemoryPage, MemoryRecordStore};
use crate::types::RawRecord;
use std::sync::Arc;

/// Build a record from a JSON object literal
pub(crate) fn record(value: serde_json::Value) -> RawRecord {
    value.as_object().cloned().unwrap()
}

/// Store of a question/answer list whose default view shows Title and Answer
pub(crate) fn faq_store() -> MemoryRecordStore {
    MemoryRecordStore::new()
        .with_default_view("All Items", &["Title", "Answer"])
        .with_view("details", &["Title", "Owner", "Dept", "Link", "Modified"])
        .with_field("Title", "Title", "Text")
        .with_field("Answer", "Answer", "Note")
        .with_field("Owner", "Owner", "User")
        .with_lookup_field("Dept", "Department", "DeptName")
        .with_field("Link", "Link", "URL")
        .with_field("Modified", "Modified", "DateTime")
}

/// Exporter for list "FAQ" backed by the given store
pub(crate) fn create_test_exporter(store: MemoryRecordStore) -> (ListExporter, Arc<MemoryRecordStore>) {
    let store = Arc::new(store);
    let config = Config::new("https://contoso.sharepoint.com/sites/hr", "FAQ");
    let exporter = ListExporter::with_store(config, store.clone()).unwrap();
    (exporter, store)
}

/// The two-record FAQ page used by most pipeline tests
pub(crate) fn faq_page() -> MemoryPage {
    MemoryPage::Ok(vec![
        record(serde_json::json!({"Title": "Q1", "Answer": "A1"})),
        record(serde_json::json!({"Title": "Q2", "Answer": "A2"})),
    ])
}

/// Exporter for an arbitrary configuration backed by the given store
pub(crate) fn create_test_exporter_with(
    config: Config,
    store: MemoryRecordStore,
) -> (ListExporter, Arc<MemoryRecordStore>) {
    let store = Arc::new(store);
    let exporter = ListExporter::with_store(config, store.clone()).unwrap();
    (exporter, store)
}
