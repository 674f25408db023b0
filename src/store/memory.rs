//! Scripted in-memory record store

use super::RecordStore;
use crate::error::{Error, Result};
use crate::query::ItemQuery;
use crate::types::{FieldDefinition, RawRecord, RecordPage, ViewInfo};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

const TOKEN_PREFIX: &str = "page-";

/// One scripted page of a [`MemoryRecordStore`]
#[derive(Clone, Debug)]
pub enum MemoryPage {
    /// Page is served with these records
    Ok(Vec<RawRecord>),
    /// Page fails
    Failed {
        /// Whether the failed response still carries the next page's token
        keeps_token: bool,
    },
}

/// A page request received by a [`MemoryRecordStore`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageRequest {
    /// First page with the rendered query string
    First(String),
    /// Continuation by token
    Next(String),
}

/// In-memory record store serving scripted metadata and pages
///
/// Page `n` (0-based) hands out the token `page-{n+1}` while further pages
/// exist. Metadata that was never configured is reported as a failure, which
/// makes it easy to exercise the resolver's error paths.
///
/// # Examples
///
/// ```
/// use export2word::store::{MemoryPage, MemoryRecordStore};
///
/// let store = MemoryRecordStore::new()
///     .with_page(MemoryPage::Ok(vec![]))
///     .with_page(MemoryPage::Failed { keeps_token: true });
/// assert_eq!(store.page_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    default_view: Option<ViewInfo>,
    views_by_id: HashMap<String, Vec<String>>,
    views_by_title: HashMap<String, Vec<String>>,
    fields: Option<Vec<FieldDefinition>>,
    pages: Vec<MemoryPage>,
    requests: Mutex<Vec<PageRequest>>,
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default view and its field names
    pub fn with_default_view(mut self, title: &str, fields: &[&str]) -> Self {
        self.default_view = Some(ViewInfo {
            id: format!("default-{}", title),
            title: title.to_string(),
        });
        self.views_by_title
            .insert(title.to_string(), fields.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Add a view reachable by id
    pub fn with_view(mut self, id: &str, fields: &[&str]) -> Self {
        self.views_by_id
            .insert(id.to_string(), fields.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Add a field definition to the list
    pub fn with_field(mut self, internal_name: &str, title: &str, type_name: &str) -> Self {
        self.fields.get_or_insert_with(Vec::new).push(FieldDefinition {
            internal_name: internal_name.to_string(),
            title: title.to_string(),
            type_as_string: type_name.to_string(),
            lookup_field: None,
        });
        self
    }

    /// Add a lookup field definition to the list
    pub fn with_lookup_field(mut self, internal_name: &str, title: &str, target: &str) -> Self {
        self.fields.get_or_insert_with(Vec::new).push(FieldDefinition {
            internal_name: internal_name.to_string(),
            title: title.to_string(),
            type_as_string: "Lookup".to_string(),
            lookup_field: Some(target.to_string()),
        });
        self
    }

    /// Append a scripted page
    pub fn with_page(mut self, page: MemoryPage) -> Self {
        self.pages.push(page);
        self
    }

    /// Number of scripted pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page requests received so far, in order
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    fn record(&self, request: PageRequest) {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request);
        }
    }

    fn serve(&self, index: usize) -> RecordPage {
        let next = (index + 1 < self.pages.len()).then(|| format!("{}{}", TOKEN_PREFIX, index + 1));
        match self.pages.get(index) {
            Some(MemoryPage::Ok(items)) => RecordPage::ok(items.clone(), next),
            Some(MemoryPage::Failed { keeps_token }) => RecordPage::failed(
                Error::PageFetch {
                    page: index + 1,
                    reason: "scripted failure".to_string(),
                },
                if *keeps_token { next } else { None },
            ),
            None => RecordPage::failed(
                Error::PageFetch {
                    page: index + 1,
                    reason: "no such page".to_string(),
                },
                None,
            ),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn view_fields_by_id(&self, list: &str, view_id: &str) -> Result<Vec<String>> {
        self.views_by_id
            .get(view_id)
            .cloned()
            .ok_or_else(|| Error::Other(format!("view '{}' not found in list '{}'", view_id, list)))
    }

    async fn default_view(&self, list: &str) -> Result<ViewInfo> {
        self.default_view
            .clone()
            .ok_or_else(|| Error::Other(format!("list '{}' has no default view", list)))
    }

    async fn view_fields_by_title(&self, list: &str, view_title: &str) -> Result<Vec<String>> {
        self.views_by_title.get(view_title).cloned().ok_or_else(|| {
            Error::Other(format!("view '{}' not found in list '{}'", view_title, list))
        })
    }

    async fn list_fields(&self, list: &str) -> Result<Vec<FieldDefinition>> {
        self.fields
            .clone()
            .ok_or_else(|| Error::Other(format!("fields of list '{}' unavailable", list)))
    }

    async fn first_page(&self, _list: &str, query: &ItemQuery) -> RecordPage {
        self.record(PageRequest::First(query.to_query_string()));
        self.serve(0)
    }

    async fn next_page(&self, token: &str) -> RecordPage {
        self.record(PageRequest::Next(token.to_string()));
        match token
            .strip_prefix(TOKEN_PREFIX)
            .and_then(|n| n.parse::<usize>().ok())
        {
            Some(index) => self.serve(index),
            None => RecordPage::failed(
                Error::Other(format!("unknown continuation token '{}'", token)),
                None,
            ),
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
