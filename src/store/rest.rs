//! SharePoint-style REST record store

use super::RecordStore;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::query::ItemQuery;
use crate::types::{FieldDefinition, RawRecord, RecordPage, ViewInfo};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

const ACCEPT_JSON: &str = "application/json;odata=nometadata";

/// Record store backed by a list REST service
///
/// Talks to the `_api/web/lists/getByTitle(...)` endpoints of a site and
/// follows `odata.nextLink` continuation URLs for paging. Accepts both the
/// `nometadata` and the verbose (`{"d": ...}`) JSON shapes.
pub struct RestRecordStore {
    /// HTTP client with timeout and default headers applied
    http_client: reqwest::Client,

    /// Site URL without trailing slash
    site_url: String,

    /// Parsed site URL; continuation links must share its origin
    site_origin: url::Url,
}

impl RestRecordStore {
    /// Create a store for the configured site
    ///
    /// # Errors
    /// Returns error if the site url cannot be parsed, the auth header is not
    /// a valid header value or the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self> {
        let site_origin = url::Url::parse(&config.site_url).map_err(|e| Error::Config {
            message: format!("invalid site url '{}': {}", config.site_url, e),
            key: Some("site_url".to_string()),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        if let Some(auth) = &config.store.auth_header {
            let value = HeaderValue::from_str(auth).map_err(|e| Error::Config {
                message: format!("invalid auth header: {}", e),
                key: Some("store.auth_header".to_string()),
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.store.request_timeout)
            .user_agent(config.store.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            site_url: config.site_url.trim_end_matches('/').to_string(),
            site_origin,
        })
    }

    /// Whether `link` has the scheme, host and port of the site
    ///
    /// The default headers carry the caller's credential, so a continuation
    /// link elsewhere is never requested.
    fn is_site_link(&self, link: &str) -> bool {
        match url::Url::parse(link) {
            Ok(url) => {
                url.scheme() == self.site_origin.scheme()
                    && url.host_str() == self.site_origin.host_str()
                    && url.port_or_known_default() == self.site_origin.port_or_known_default()
            }
            Err(_) => false,
        }
    }

    fn list_endpoint(&self, list: &str) -> String {
        format!(
            "{}/_api/web/lists/getByTitle('{}')",
            self.site_url,
            odata_literal(list)
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        debug!(url, "GET");
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let json: Value = serde_json::from_str(&body)?;
        Ok(unwrap_verbose(json))
    }

    async fn get_string_items(&self, url: &str) -> Result<Vec<String>> {
        let json = self.get_json(url).await?;
        parse_string_items(&json)
    }

    async fn fetch_page(&self, url: &str) -> Result<(Vec<RawRecord>, Option<String>)> {
        let json = self.get_json(url).await?;
        parse_items_page(json)
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn view_fields_by_id(&self, list: &str, view_id: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/Views('{}')/ViewFields",
            self.list_endpoint(list),
            odata_literal(view_id)
        );
        self.get_string_items(&url).await
    }

    async fn default_view(&self, list: &str) -> Result<ViewInfo> {
        let url = format!("{}/DefaultView", self.list_endpoint(list));
        let json = self.get_json(&url).await?;
        Ok(serde_json::from_value(json)?)
    }

    async fn view_fields_by_title(&self, list: &str, view_title: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/Views/getByTitle('{}')/ViewFields",
            self.list_endpoint(list),
            odata_literal(view_title)
        );
        self.get_string_items(&url).await
    }

    async fn list_fields(&self, list: &str) -> Result<Vec<FieldDefinition>> {
        let url = format!("{}/Fields", self.list_endpoint(list));
        let json = self.get_json(&url).await?;
        let values = collection(json).ok_or_else(|| {
            Error::Other(format!("field collection missing from response of {}", url))
        })?;
        // A definition that cannot be read only matters if the view shows it,
        // and then resolution reports the field as missing.
        Ok(values
            .into_iter()
            .filter_map(|v| match serde_json::from_value::<FieldDefinition>(v) {
                Ok(definition) => Some(definition),
                Err(e) => {
                    warn!(list, error = %e, "skipping unreadable field definition");
                    None
                }
            })
            .collect())
    }

    async fn first_page(&self, list: &str, query: &ItemQuery) -> RecordPage {
        let url = format!("{}/items{}", self.list_endpoint(list), query);
        match self.fetch_page(&url).await {
            Ok((items, next)) => RecordPage::ok(items, next),
            Err(e) => {
                warn!(error = %e, url = %url, "first item page failed");
                RecordPage::failed(e, None)
            }
        }
    }

    async fn next_page(&self, token: &str) -> RecordPage {
        if !self.is_site_link(token) {
            warn!(
                url = token,
                site = %self.site_url,
                "continuation link leaves the site, not following"
            );
            return RecordPage::failed(
                Error::Other(format!(
                    "continuation link '{}' is not on site '{}'",
                    token, self.site_url
                )),
                None,
            );
        }

        match self.fetch_page(token).await {
            Ok((items, next)) => RecordPage::ok(items, next),
            Err(e) => {
                warn!(error = %e, url = token, "item page failed");
                RecordPage::failed(e, None)
            }
        }
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}

/// Quote a value for use inside an OData string literal in a URL path
fn odata_literal(value: &str) -> String {
    urlencoding::encode(&value.replace('\'', "''")).into_owned()
}

/// Strip the `{"d": ...}` envelope of verbose responses
fn unwrap_verbose(json: Value) -> Value {
    match json {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("d") => {
            map.remove("d").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Extract the array of a collection response (`value` or verbose `results`)
fn collection(json: Value) -> Option<Vec<Value>> {
    match json {
        Value::Array(values) => Some(values),
        Value::Object(mut map) => match map.remove("value").or_else(|| map.remove("results")) {
            Some(Value::Array(values)) => Some(values),
            _ => None,
        },
        _ => None,
    }
}

/// Parse a view-fields response: `{"Items": [..]}` or `{"Items": {"results": [..]}}`
fn parse_string_items(json: &Value) -> Result<Vec<String>> {
    let items = match json.get("Items") {
        Some(Value::Array(items)) => items,
        Some(Value::Object(obj)) => match obj.get("results") {
            Some(Value::Array(items)) => items,
            _ => return Err(Error::Other("view field list has no results".to_string())),
        },
        _ => match json.get("value") {
            Some(Value::Array(items)) => items,
            _ => return Err(Error::Other("view field list missing Items".to_string())),
        },
    };

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(String::from)
                .ok_or_else(|| Error::Other(format!("view field name is not a string: {}", item)))
        })
        .collect()
}

/// Parse an item page into records and the continuation token
fn parse_items_page(json: Value) -> Result<(Vec<RawRecord>, Option<String>)> {
    let Value::Object(mut map) = json else {
        return Err(Error::Other("item page is not a JSON object".to_string()));
    };

    let next = ["odata.nextLink", "@odata.nextLink", "__next"]
        .iter()
        .find_map(|key| map.remove(*key))
        .and_then(|v| v.as_str().map(String::from))
        .filter(|link| !link.is_empty());

    let values = match map.remove("value").or_else(|| map.remove("results")) {
        Some(Value::Array(values)) => values,
        _ => return Err(Error::Other("item page has no value array".to_string())),
    };

    let items = values
        .into_iter()
        .map(|v| match v {
            Value::Object(record) => Ok(record),
            other => Err(Error::Other(format!("item is not a JSON object: {}", other))),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((items, next))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer) -> RestRecordStore {
        let mut config = Config::new(format!("{}/sites/hr/", server.uri()), "FAQ");
        config.store.auth_header = Some("Bearer test-token".to_string());
        RestRecordStore::new(&config).unwrap()
    }

    #[test]
    fn test_odata_literal_escapes_quotes_and_spaces() {
        assert_eq!(odata_literal("FAQ"), "FAQ");
        assert_eq!(odata_literal("Bob's List"), "Bob%27%27s%20List");
    }

    #[test]
    fn test_parse_items_page_variants() {
        let (items, next) = parse_items_page(json!({
            "value": [{"Title": "Q1"}, {"Title": "Q2"}],
            "odata.nextLink": "https://contoso/_api/next?$skiptoken=1"
        }))
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(next.as_deref(), Some("https://contoso/_api/next?$skiptoken=1"));

        let (items, next) = parse_items_page(json!({
            "results": [{"Title": "Q1"}],
            "__next": "https://contoso/next"
        }))
        .unwrap();
        assert_eq!(items.len(), 1);
        assert!(next.is_some());

        let (_, next) = parse_items_page(json!({"value": []})).unwrap();
        assert!(next.is_none());

        assert!(parse_items_page(json!({"value": [1, 2]})).is_err());
        assert!(parse_items_page(json!([])).is_err());
    }

    #[test]
    fn test_parse_string_items_variants() {
        assert_eq!(
            parse_string_items(&json!({"Items": ["Title", "Answer"]})).unwrap(),
            ["Title", "Answer"]
        );
        assert_eq!(
            parse_string_items(&json!({"Items": {"results": ["Title"]}})).unwrap(),
            ["Title"]
        );
        assert!(parse_string_items(&json!({"SchemaXml": ""})).is_err());
        assert!(parse_string_items(&json!({"Items": [1]})).is_err());
    }

    #[tokio::test]
    async fn test_default_view_and_fields() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sites/hr/_api/web/lists/getByTitle('FAQ')/DefaultView"))
            .and(header("Authorization", "Bearer test-token"))
            .and(header("Accept", ACCEPT_JSON))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"Id": "v1", "Title": "All Items"})),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(
                "/sites/hr/_api/web/lists/getByTitle('FAQ')/Views/getByTitle('All%20Items')/ViewFields",
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"d": {"Items": {"results": ["Title", "Answer"]}}})),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/sites/hr/_api/web/lists/getByTitle('FAQ')/Fields"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    {"InternalName": "Title", "Title": "Title", "TypeAsString": "Text"},
                    {"InternalName": "Answer", "Title": "Answer", "TypeAsString": "Note"}
                ]
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let view = store.default_view("FAQ").await.unwrap();
        assert_eq!(view.title, "All Items");

        let names = store.view_fields_by_title("FAQ", &view.title).await.unwrap();
        assert_eq!(names, ["Title", "Answer"]);

        let fields = store.list_fields("FAQ").await.unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].type_as_string, "Note");
    }

    #[tokio::test]
    async fn test_view_fields_by_id_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sites/hr/_api/web/lists/getByTitle('FAQ')/Views('abc')/ViewFields"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let err = store.view_fields_by_id("FAQ", "abc").await.unwrap_err();
        assert!(matches!(err, Error::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_first_page_sends_query_and_reads_next_link() {
        let server = MockServer::start().await;
        let next = format!("{}/sites/hr/_api/next-page", server.uri());

        Mock::given(method("GET"))
            .and(path("/sites/hr/_api/web/lists/getByTitle('FAQ')/items"))
            .and(query_param("$select", "Title,Owner/Title"))
            .and(query_param("$expand", "Owner"))
            .and(query_param("$top", "5000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"Title": "Q1", "Owner": {"Title": "Ann"}}],
                "odata.nextLink": next
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let query = ItemQuery {
            select: vec!["Title".into(), "Owner/Title".into()],
            expand: vec!["Owner".into()],
            top: Some(5000),
        };
        let page = store.first_page("FAQ", &query).await;

        assert!(page.success);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.continuation_token.as_deref(), Some(next.as_str()));
    }

    #[tokio::test]
    async fn test_failed_page_is_reported_not_raised() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let page = store.next_page(&format!("{}/broken", server.uri())).await;

        assert!(!page.success);
        assert!(page.items.is_empty());
        assert!(page.continuation_token.is_none());
        assert!(matches!(
            page.failure_detail,
            Some(Error::Http { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_foreign_continuation_link_is_not_followed() {
        let server = MockServer::start().await;
        let foreign = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
            .expect(0)
            .mount(&foreign)
            .await;

        let store = store_for(&server);
        let page = store.next_page(&format!("{}/steal", foreign.uri())).await;

        assert!(!page.success);
        assert!(page.continuation_token.is_none());
        assert!(matches!(page.failure_detail, Some(Error::Other(_))));
        assert!(foreign.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_site_link_requires_same_origin() {
        let config = Config::new("https://contoso.sharepoint.com/sites/hr", "FAQ");
        let store = RestRecordStore::new(&config).unwrap();

        assert!(store.is_site_link("https://contoso.sharepoint.com/sites/hr/_api/next"));
        assert!(store.is_site_link("https://contoso.sharepoint.com:443/other"));
        assert!(!store.is_site_link("http://contoso.sharepoint.com/sites/hr/_api/next"));
        assert!(!store.is_site_link("https://evil.example.com/sites/hr/_api/next"));
        assert!(!store.is_site_link("https://contoso.sharepoint.com:8443/sites/hr"));
        assert!(!store.is_site_link("not a url"));
    }

    #[tokio::test]
    async fn test_unreadable_field_definitions_are_skipped() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sites/hr/_api/web/lists/getByTitle('FAQ')/Fields"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    {"InternalName": "Title", "Title": "Title", "TypeAsString": "Text"},
                    {"InternalName": "Legacy", "Title": null, "TypeAsString": null},
                    {"Title": "no internal name", "TypeAsString": "Text"},
                    {"InternalName": 7, "Title": "Broken", "TypeAsString": "Text"}
                ]
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let fields = store.list_fields("FAQ").await.unwrap();

        let names: Vec<&str> = fields.iter().map(|f| f.internal_name.as_str()).collect();
        assert_eq!(names, ["Title", "Legacy"]);
        assert_eq!(fields[1].type_as_string, "");
    }

    #[test]
    fn test_invalid_auth_header_is_config_error() {
        let mut config = Config::new("https://contoso", "FAQ");
        config.store.auth_header = Some("Bearer\nbroken".to_string());
        assert!(matches!(
            RestRecordStore::new(&config),
            Err(Error::Config { .. })
        ));
    }
}
