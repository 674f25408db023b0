//! Remote record store access
//!
//! The pipeline talks to the list service only through the [`RecordStore`]
//! trait: a handful of metadata reads plus "first page by query" and "next
//! page by continuation token". Two implementations are provided:
//!
//! - [`RestRecordStore`]: SharePoint-style REST service over HTTP
//! - [`MemoryRecordStore`]: scripted in-memory store for tests and offline use
//!
//! ## Usage
//!
//! ```no_run
//! use export2word::store::{RecordStore, RestRecordStore};
//! use export2word::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("https://contoso.sharepoint.com/sites/hr", "FAQ");
//!     let store = RestRecordStore::new(&config)?;
//!
//!     let view = store.default_view("FAQ").await?;
//!     println!("default view: {}", view.title);
//!     Ok(())
//! }
//! ```

mod memory;
mod rest;

pub use memory::{MemoryPage, MemoryRecordStore, PageRequest};
pub use rest::RestRecordStore;

use crate::query::ItemQuery;
use crate::types::{FieldDefinition, RecordPage, ViewInfo};
use async_trait::async_trait;

/// Read access to a paginated list service
///
/// Metadata reads return errors; page reads never do. A page read reports
/// failure through [`RecordPage::success`] so one bad page cannot abort a
/// paged fetch.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Field names of the view with the given id, in view order
    async fn view_fields_by_id(&self, list: &str, view_id: &str) -> crate::Result<Vec<String>>;

    /// The list's default view
    async fn default_view(&self, list: &str) -> crate::Result<ViewInfo>;

    /// Field names of the view with the given title, in view order
    async fn view_fields_by_title(
        &self,
        list: &str,
        view_title: &str,
    ) -> crate::Result<Vec<String>>;

    /// Every field defined on the list
    async fn list_fields(&self, list: &str) -> crate::Result<Vec<FieldDefinition>>;

    /// First page of items matching the query
    async fn first_page(&self, list: &str, query: &ItemQuery) -> RecordPage;

    /// The page a continuation token points at
    async fn next_page(&self, token: &str) -> RecordPage;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
