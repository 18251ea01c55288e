use std::time::Duration;

use docsearch_core::contract::SearchRequest;
use docsearch_core::lookup::{HttpLookupService, LookupError, LookupService};
use docsearch_core::pipeline::{AppState, SearchError};
use docsearch_core::registry::FileRegistry;
use docsearch_core::render::ResultsView;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn lookup_for(server: &MockServer, timeout: Option<Duration>) -> HttpLookupService {
    HttpLookupService::new(&format!("{}/", server.uri()), timeout).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn posts_payload_as_query_parameter_and_body() {
    let server = MockServer::start().await;
    let request = SearchRequest::new("spec.pdf", "pressure, valve");
    let encoded = request.to_json().unwrap();

    Mock::given(method("POST"))
        .and(path("/"))
        .and(query_param("payload", encoded.as_str()))
        .and(body_json(json!({
            "payload": { "pdf_file_name": "spec.pdf", "keywords": ["pressure", "valve"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pressure": [["7", "value", "100 psi"]],
            "valve": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = lookup_for(&server, None)
        .lookup(&request)
        .await
        .unwrap()
        .expect("service returned an object");

    let keys: Vec<&str> = result.groups().iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["pressure", "valve"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn non_success_status_maps_to_no_result_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "SpecA": null })))
        .mount(&server)
        .await;

    let error = lookup_for(&server, None)
        .lookup(&SearchRequest::new("spec.pdf", "SpecA"))
        .await
        .unwrap_err();

    assert!(matches!(error, LookupError::Status(404)));
    assert_eq!(error.to_string(), "No Result Found");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn undecodable_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let error = lookup_for(&server, None)
        .lookup(&SearchRequest::new("spec.pdf", "SpecA"))
        .await
        .unwrap_err();

    assert!(matches!(error, LookupError::Decode(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn configured_timeout_surfaces_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let error = lookup_for(&server, Some(Duration::from_millis(100)))
        .lookup(&SearchRequest::new("spec.pdf", "SpecA"))
        .await
        .unwrap_err();

    assert!(matches!(error, LookupError::Transport(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn end_to_end_failure_leaves_registry_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut state = AppState::new(FileRegistry::default());
    state.select_index(1).unwrap();
    let registry_before = state.registry().clone();

    let result = state.search(&lookup_for(&server, None), "shutdown").await;

    assert_eq!(result, Err(SearchError::RequestFailed("No Result Found".into())));
    assert_eq!(state.results().to_html(), "<p>Error fetching data: No Result Found</p>");
    assert_eq!(state.registry(), &registry_before);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn end_to_end_success_renders_rows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "SpecA": [["12", "value", "100 psi"]] })),
        )
        .mount(&server)
        .await;

    let mut state = AppState::new(FileRegistry::seeded(8, &["spec.pdf"]));
    state.select_index(0).unwrap();
    state.search(&lookup_for(&server, None), "SpecA").await.unwrap();

    match state.results() {
        ResultsView::Table(table) => assert_eq!(table.rows.len(), 1),
        other => panic!("expected table, got {other:?}"),
    }
    assert!(state
        .results()
        .to_html()
        .contains("<tr><td>SpecA</td><td>12</td><td>VALUE</td><td>100 psi</td></tr>"));
}
