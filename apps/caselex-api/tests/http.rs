use std::{sync::Arc, time::Duration};

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use caselex_api::{routes, state::AppState};
use caselex_config::Config;
use caselex_domain::Corpus;
use caselex_service::{BoxFuture, CaseSearchService, LinkProbe, ProbeVerdict};

struct BrokenProbe;
impl LinkProbe for BrokenProbe {
	fn probe<'a>(&'a self, _: &'a str, _: Duration) -> BoxFuture<'a, ProbeVerdict> {
		Box::pin(async { ProbeVerdict::Broken })
	}
}

fn test_config() -> Config {
	caselex_config::parse(
		r#"
[service]
http_bind = "127.0.0.1:0"
log_level = "info"
"#,
	)
	.expect("Failed to parse test config.")
}

fn app() -> Router {
	let state = AppState::new(test_config()).expect("Failed to initialize app state.");

	routes::router(state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
	let response = app
		.oneshot(Request::builder().uri(uri).body(Body::empty()).expect("Failed to build request."))
		.await
		.expect("Failed to call app.");
	let status = response.status();
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	if body.is_empty() {
		return (status, Value::Null);
	}

	(status, serde_json::from_slice(&body).expect("Failed to parse response."))
}

#[tokio::test]
async fn health_ok() {
	let (status, _) = get(app(), "/health").await;

	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn search_returns_ranked_cases_with_links_and_note() {
	let (status, json) =
		get(app(), "/v1/cases/search?query=fuera%20de%20ordenaci%C3%B3n&limit=10").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["query"], "fuera de ordenación");
	assert_eq!(json["total"], 1);
	assert_eq!(json["filters"]["order"], "hybrid-desc");

	let top = &json["results"][0];

	assert_eq!(top["case_id"], "28079130012022000456");
	assert_eq!(top["relevance"], 82);
	assert_eq!(top["link_strategy"], "direct");
	assert_eq!(top["validation"], "not_requested");
	assert_eq!(top["direct_link_ok"], Value::Null);
	assert_eq!(top["preferred_link"], top["direct_link"]);
	assert!(json["note"].as_str().is_some_and(|note| note.contains("hybrid ranking")));
}

#[tokio::test]
async fn inverted_dates_are_echoed_corrected() {
	let (status, json) = get(
		app(),
		"/v1/cases/search?query=volumen%20disconforme&date_from=2025-01-01&date_to=2020-01-01",
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["filters"]["date_from"], "2020-01-01");
	assert_eq!(json["filters"]["date_to"], "2025-01-01");
	assert!(json["note"].as_str().is_some_and(|note| note.contains("inverted date range")));
}

#[tokio::test]
async fn short_query_is_a_client_error() {
	let (status, json) = get(app(), "/v1/cases/search?query=ab").await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "invalid_request");
	assert_eq!(json["fields"][0], "query");
}

#[tokio::test]
async fn malformed_date_names_the_field() {
	let (status, json) = get(app(), "/v1/cases/search?query=suelo&date_from=03-11-2022").await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "invalid_request");
	assert_eq!(json["fields"][0], "date_from");
}

#[tokio::test]
async fn unknown_order_is_rejected_as_invalid_request() {
	let (status, json) = get(app(), "/v1/cases/search?query=suelo&order=newest").await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "invalid_request");
	assert_eq!(json["fields"], Value::Null);
}

#[tokio::test]
async fn empty_result_is_a_success_with_suggestions() {
	let (status, json) = get(app(), "/v1/cases/search?query=permuta%20de%20solares").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["total"], 0);
	assert!(json["note"].as_str().is_some_and(|note| note.contains("Suggestions:")));
}

#[tokio::test]
async fn broken_links_fall_back_to_stable() {
	let service = CaseSearchService::with_probe(
		test_config(),
		Corpus::seed().expect("Seed corpus must load."),
		Arc::new(BrokenProbe),
	);
	let app = routes::router(AppState::from_service(service));
	let (status, json) =
		get(app, "/v1/cases/search?query=fuera%20de%20ordenacion&validate_links=true").await;
	let top = &json["results"][0];

	assert_eq!(status, StatusCode::OK);
	assert_eq!(top["link_strategy"], "stable");
	assert_eq!(top["validation"], "broken");
	assert_eq!(top["direct_link_ok"], false);
	assert_eq!(top["preferred_link"], top["stable_link"]);
}
