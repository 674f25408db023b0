//! Exhaustive, cursor-chained record retrieval
//!
//! The first request carries the select/expand query plus the page-size
//! ceiling; every further request carries only the continuation token of the
//! previous response. Pages are strictly sequential since each token is only
//! known once the previous page has arrived.
//!
//! A failed page never aborts the chain. If the failed response still holds
//! a continuation token the chain goes on with it, otherwise it ends there.
//! Only successful pages contribute records.

use crate::query::ItemQuery;
use crate::store::RecordStore;
use crate::types::{ExportResult, RecordPage};
use tracing::{debug, info, warn};

/// Default page-size ceiling of the first request
pub const DEFAULT_PAGE_SIZE: u32 = 5000;

/// Default upper bound on pages followed in one fetch
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Every page received for one list, in request order
#[derive(Debug)]
pub struct PagedFetch {
    /// Title of the fetched list
    pub list_title: String,
    /// Pages in request order, failed ones included
    pub pages: Vec<RecordPage>,
}

impl PagedFetch {
    /// Number of pages whose records were dropped
    pub fn failed_pages(&self) -> usize {
        self.pages.iter().filter(|p| !p.success).count()
    }

    /// Concatenate the records of every successful page, in page order
    ///
    /// Failed pages are logged and skipped.
    pub fn into_export_result(self) -> ExportResult {
        let mut items = Vec::new();
        for (index, page) in self.pages.into_iter().enumerate() {
            if page.success {
                items.extend(page.items);
            } else {
                match &page.failure_detail {
                    Some(e) => warn!(list = %self.list_title, page = index + 1, error = %e, "dropping records of failed page"),
                    None => warn!(list = %self.list_title, page = index + 1, "dropping records of failed page"),
                }
            }
        }

        info!(list = %self.list_title, items = items.len(), "items collected");
        ExportResult {
            list_title: self.list_title,
            items,
        }
    }
}

/// Drives paged retrieval of a list's records from a [`RecordStore`]
pub struct RecordPager<'a> {
    store: &'a dyn RecordStore,
    page_size: u32,
    max_pages: usize,
}

impl<'a> RecordPager<'a> {
    /// Create a pager with the default page size and page limit
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Set the page-size ceiling sent with the first request
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the maximum number of pages followed
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Retrieve every page of `list` matching `query`
    pub async fn fetch_pages(&self, list: &str, query: &ItemQuery) -> PagedFetch {
        let mut pages: Vec<RecordPage> = Vec::new();

        debug!(list, store = self.store.name(), page_size = self.page_size, "requesting first page");
        let first_query = query.clone().with_top(self.page_size);
        let first = self.store.first_page(list, &first_query).await;
        let mut token = first.continuation_token.clone();
        log_page(list, 1, &first);
        pages.push(first);

        while let Some(next) = token {
            if pages.len() >= self.max_pages {
                warn!(list, pages = pages.len(), "page limit reached, stopping pagination");
                break;
            }

            let page = self.store.next_page(&next).await;
            token = page.continuation_token.clone();
            log_page(list, pages.len() + 1, &page);
            pages.push(page);
        }

        PagedFetch {
            list_title: list.to_string(),
            pages,
        }
    }

    /// Retrieve and accumulate every record of `list` matching `query`
    ///
    /// Never fails: an empty result is the no-data signal, including when
    /// the very first page fails.
    pub async fn fetch_all(&self, list: &str, query: &ItemQuery) -> ExportResult {
        self.fetch_pages(list, query).await.into_export_result()
    }
}

fn log_page(list: &str, number: usize, page: &RecordPage) {
    debug!(
        list,
        page = number,
        success = page.success,
        items = page.items.len(),
        more = page.continuation_token.is_some(),
        "page received"
    );
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryPage, MemoryRecordStore, PageRequest};
    use crate::types::RawRecord;
    use serde_json::json;

    fn records(prefix: &str, count: usize) -> Vec<RawRecord> {
        (0..count)
            .map(|i| {
                json!({ "Title": format!("{}-{}", prefix, i) })
                    .as_object()
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }

    fn titles(result: &ExportResult) -> Vec<String> {
        result
            .items
            .iter()
            .map(|r| r["Title"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_all_pages_are_concatenated_in_order() {
        let store = MemoryRecordStore::new()
            .with_page(MemoryPage::Ok(records("a", 2)))
            .with_page(MemoryPage::Ok(records("b", 3)))
            .with_page(MemoryPage::Ok(records("c", 1)));

        let result = RecordPager::new(&store)
            .fetch_all("FAQ", &ItemQuery::default())
            .await;

        assert_eq!(result.list_title, "FAQ");
        assert_eq!(titles(&result), ["a-0", "a-1", "b-0", "b-1", "b-2", "c-0"]);
    }

    #[tokio::test]
    async fn test_only_first_request_carries_query_and_top() {
        let store = MemoryRecordStore::new()
            .with_page(MemoryPage::Ok(records("a", 1)))
            .with_page(MemoryPage::Ok(records("b", 1)));
        let query = ItemQuery {
            select: vec!["Title".into()],
            expand: vec![],
            top: None,
        };

        RecordPager::new(&store)
            .with_page_size(100)
            .fetch_all("FAQ", &query)
            .await;

        assert_eq!(
            store.requests(),
            [
                PageRequest::First("?$select=Title&$top=100".to_string()),
                PageRequest::Next("page-1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_middle_page_is_skipped_and_chain_continues() {
        let store = MemoryRecordStore::new()
            .with_page(MemoryPage::Ok(records("a", 2)))
            .with_page(MemoryPage::Failed { keeps_token: true })
            .with_page(MemoryPage::Ok(records("c", 2)))
            .with_page(MemoryPage::Ok(records("d", 1)));

        let pager = RecordPager::new(&store);
        let fetch = pager.fetch_pages("FAQ", &ItemQuery::default()).await;
        assert_eq!(fetch.pages.len(), 4);
        assert_eq!(fetch.failed_pages(), 1);

        let result = fetch.into_export_result();
        assert_eq!(titles(&result), ["a-0", "a-1", "c-0", "c-1", "d-0"]);
    }

    #[tokio::test]
    async fn test_failed_page_without_token_ends_chain() {
        let store = MemoryRecordStore::new()
            .with_page(MemoryPage::Ok(records("a", 1)))
            .with_page(MemoryPage::Failed { keeps_token: false })
            .with_page(MemoryPage::Ok(records("c", 1)));

        let fetch = RecordPager::new(&store)
            .fetch_pages("FAQ", &ItemQuery::default())
            .await;

        assert_eq!(fetch.pages.len(), 2);
        assert_eq!(titles(&fetch.into_export_result()), ["a-0"]);
    }

    #[tokio::test]
    async fn test_failed_first_page_yields_empty_result() {
        let store = MemoryRecordStore::new().with_page(MemoryPage::Failed { keeps_token: false });

        let result = RecordPager::new(&store)
            .fetch_all("FAQ", &ItemQuery::default())
            .await;

        assert!(result.items.is_empty());
        assert_eq!(store.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_page_limit_stops_endless_chain() {
        let mut store = MemoryRecordStore::new();
        for i in 0..10 {
            store = store.with_page(MemoryPage::Ok(records(&format!("p{}", i), 1)));
        }

        let fetch = RecordPager::new(&store)
            .with_max_pages(3)
            .fetch_pages("FAQ", &ItemQuery::default())
            .await;

        assert_eq!(fetch.pages.len(), 3);
        assert_eq!(titles(&fetch.into_export_result()), ["p0-0", "p1-0", "p2-0"]);
    }
}
