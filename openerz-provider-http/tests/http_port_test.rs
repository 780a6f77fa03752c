use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use httpmock::prelude::*;
use openerz_core::{
    CalendarPort, CalendarRequest, Clock, DateWindow, Diagnostics, PickupQuery, PostalCode,
    QueryIssue, ResponseState, WasteType,
};
use openerz_provider_http::{BASE_URL, OpenErzHttpPort, USER_AGENT, client, connector};
use serde_json::json;

struct FixedClock(NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[derive(Default)]
struct RecordingDiagnostics(Mutex<Vec<QueryIssue>>);

impl RecordingDiagnostics {
    fn issues(&self) -> Vec<QueryIssue> {
        self.0.lock().expect("diagnostics lock").clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, issue: &QueryIssue) {
        self.0.lock().expect("diagnostics lock").push(issue.clone());
    }
}

fn mocked_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, 12, 10)
        .and_then(|date| date.and_hms_opt(11, 15, 0))
        .expect("valid test date")
}

fn glass_query(base_url: &str, diagnostics: &Arc<RecordingDiagnostics>) -> PickupQuery {
    let zip = PostalCode::new(1234).expect("valid zip");
    let sink = Arc::clone(diagnostics);
    connector(
        client().expect("http client"),
        base_url,
        zip,
        WasteType::from("glass"),
    )
    .with_clock(Arc::new(FixedClock(mocked_now())))
    .with_diagnostics(sink)
}

#[tokio::test]
async fn find_next_pickup_end_to_end() {
    let server = MockServer::start_async().await;
    let calendar = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/calendar/glass.json")
                .query_param("zip", "1234")
                .query_param("start", "2019-12-10")
                .query_param("end", "2020-01-10")
                .query_param("offset", "0")
                .query_param("limit", "0")
                .query_param("lang", "en")
                .query_param("sort", "date")
                .header("accept", "application/json")
                .header("user-agent", USER_AGENT);
            then.status(200).json_body(json!({
                "_metadata": {"total_count": 1},
                "result": [{"zip": 1234, "type": "glass", "date": "2020-01-10"}],
            }));
        })
        .await;

    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let mut query = glass_query(&server.base_url(), &diagnostics);

    let pickup = query.find_next_pickup(31).await;

    calendar.assert_async().await;
    assert_eq!(
        pickup.map(|day| day.to_string()).as_deref(),
        Some("2020-01-10"),
        "pickup date"
    );
    assert!(diagnostics.issues().is_empty(), "nothing reported");
}

#[tokio::test]
async fn not_found_is_stored_and_reported() {
    let server = MockServer::start_async().await;
    let calendar = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/calendar/glass.json");
            then.status(404).body("Not Found");
        })
        .await;

    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let mut query = glass_query(&server.base_url(), &diagnostics);

    assert_eq!(query.find_next_pickup(31).await, None, "no date");

    calendar.assert_async().await;
    let raw = query.response().raw().expect("response stored");
    assert_eq!(raw.status, 404, "status");
    assert!(!raw.ok, "not ok");
    assert_eq!(raw.body, "Not Found", "body");
    let issues = diagnostics.issues();
    assert_eq!(
        issues,
        vec![QueryIssue::UnsuccessfulResponse { status: 404 }],
        "issues"
    );
    assert!(
        issues.iter().all(|issue| issue.to_string().contains("404")),
        "status in message"
    );
}

#[tokio::test]
async fn server_error_body_is_not_parsed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/calendar/paper.json");
            then.status(500).body("<html>boom</html>");
        })
        .await;

    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let zip = PostalCode::new(8001).expect("valid zip");
    let sink = Arc::clone(&diagnostics);
    let mut query = connector(
        client().expect("http client"),
        &server.base_url(),
        zip,
        WasteType::Paper,
    )
    .with_diagnostics(sink);

    assert_eq!(query.find_next_pickup(15).await, None, "no date");
    let kinds: Vec<_> = diagnostics.issues().iter().map(QueryIssue::kind).collect();
    assert_eq!(kinds, vec!["unsuccessful_response"], "issue kinds");
}

#[tokio::test]
async fn empty_calendar_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/calendar/glass.json");
            then.status(200)
                .json_body(json!({"_metadata": {"total_count": 0}, "result": []}));
        })
        .await;

    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let mut query = glass_query(&server.base_url(), &diagnostics);

    assert_eq!(query.find_next_pickup(31).await, None, "no date");
    assert_eq!(
        diagnostics.issues(),
        vec![QueryIssue::EmptyResultSet],
        "issues"
    );
}

#[tokio::test]
async fn refused_connection_is_swallowed() {
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let mut query = glass_query("http://127.0.0.1:1", &diagnostics);

    assert_eq!(query.find_next_pickup(31).await, None, "no date");

    assert_eq!(
        query.response(),
        &ResponseState::TransportFailed,
        "no response stored"
    );
    let issues = diagnostics.issues();
    assert_eq!(issues.len(), 1, "one issue");
    let issue = issues.first().expect("issue recorded");
    assert_eq!(issue.kind(), "connection_failure", "kind");
    let text = issue.to_string();
    assert!(text.contains("Network error"), "transport in message: {text}");
    assert!(
        text.to_lowercase().contains("refused"),
        "underlying cause in message: {text}"
    );
}

#[tokio::test]
async fn port_returns_raw_response_for_any_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/calendar/organic.json");
            then.status(410).body("gone");
        })
        .await;

    let port = OpenErzHttpPort::with_base_url(client().expect("http client"), server.base_url());
    let window = DateWindow::starting_at(mocked_now());
    let zip = PostalCode::new(8001).expect("valid zip");
    let request = CalendarRequest::new(zip, WasteType::Organic, &window);

    let raw = port.fetch(&request).await.expect("response");

    assert_eq!(raw.status, 410, "status");
    assert!(!raw.ok, "client errors are not ok");
    assert_eq!(raw.body, "gone", "body");
}

#[test]
fn url_embeds_waste_type_in_path() {
    let port = OpenErzHttpPort::new(client().expect("http client"));
    let window = DateWindow::starting_at(mocked_now());
    let zip = PostalCode::new(1234).expect("valid zip");
    let request = CalendarRequest::new(zip, WasteType::from("glass"), &window);

    assert_eq!(port.base_url(), BASE_URL, "default base url");
    assert_eq!(
        port.url_for(&request),
        "http://openerz.metaodi.ch/api/calendar/glass.json",
        "url"
    );
}

#[test]
fn trailing_slash_in_base_url_is_ignored() {
    let port = OpenErzHttpPort::with_base_url(
        client().expect("http client"),
        "http://localhost:8080/",
    );
    let window = DateWindow::starting_at(mocked_now());
    let zip = PostalCode::new(8001).expect("valid zip");
    let request = CalendarRequest::new(zip, WasteType::Textile, &window);

    assert_eq!(
        port.url_for(&request),
        "http://localhost:8080/api/calendar/textile.json",
        "url"
    );
}
