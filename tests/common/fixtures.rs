//! Mock list service fixtures

use export2word::Config;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Site path every fixture list lives under
pub const SITE_PATH: &str = "/sites/hr";

/// Path of a list endpoint below the site
pub fn list_path(list: &str, rest: &str) -> String {
    format!("{}/_api/web/lists/getByTitle('{}'){}", SITE_PATH, list, rest)
}

/// Exporter config pointing at the mock server
pub fn config_for(server: &MockServer, list: &str) -> Config {
    let mut config = Config::new(format!("{}{}", server.uri(), SITE_PATH), list);
    config.store.auth_header = Some("Bearer e2e-token".to_string());
    config
}

/// Mount default view, view fields and field definitions of a list
pub async fn mount_metadata(server: &MockServer, list: &str, view_fields: &[&str], fields: Value) {
    Mock::given(method("GET"))
        .and(path(list_path(list, "/DefaultView")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"Id": "v1", "Title": "AllItems"})),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(list_path(list, "/Views/getByTitle('AllItems')/ViewFields")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Items": view_fields})))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(list_path(list, "/Fields")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": fields})))
        .mount(server)
        .await;
}

/// Mount the FAQ list: Title and Answer in the default view
pub async fn mount_faq_metadata(server: &MockServer) {
    mount_metadata(
        server,
        "FAQ",
        &["Title", "Answer"],
        json!([
            {"InternalName": "Title", "Title": "Title", "TypeAsString": "Text"},
            {"InternalName": "Answer", "Title": "Answer", "TypeAsString": "Note"},
            {"InternalName": "Created", "Title": "Created", "TypeAsString": "DateTime"}
        ]),
    )
    .await;
}

/// Mount the first item page of a list
pub async fn mount_first_page(server: &MockServer, list: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(list_path(list, "/items")))
        .and(query_param("$top", "5000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a continuation page at `page_path`
pub async fn mount_next_page(server: &MockServer, page_path: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

/// Absolute continuation link for a path on the mock server
pub fn next_link(server: &MockServer, page_path: &str) -> String {
    format!("{}{}", server.uri(), page_path)
}
