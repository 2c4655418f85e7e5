//! Shared test helpers for Google Calendar integration tests
//!
//! Each helper mounts mock endpoints on a wiremock server. Clients are
//! pointed at the server root, so request paths are `/users/me/...` and
//! `/calendars/...`.

use roomsync_google::{client::GoogleCalendarClient, provider::GoogleCalendarProvider};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Access token the mock clients send
pub const TEST_TOKEN: &str = "test-access-token";

/// Starts a mock server and returns a client pointing at it
pub async fn setup_calendar_mock() -> (MockServer, GoogleCalendarClient) {
    let server = MockServer::start().await;
    let client = GoogleCalendarClient::with_base_url(TEST_TOKEN, server.uri());
    (server, client)
}

/// Starts a mock server and returns a provider pointing at it
#[allow(dead_code)]
pub async fn setup_provider_mock() -> (MockServer, GoogleCalendarProvider) {
    let (server, client) = setup_calendar_mock().await;
    (server, GoogleCalendarProvider::new(client))
}

/// A Google API error body with a single reason
pub fn google_error(code: u16, reason: &str) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "code": code,
            "message": format!("{reason} message"),
            "errors": [{ "domain": "global", "reason": reason, "message": "details" }]
        }
    })
}

/// Mounts `GET /users/me/calendarList` returning `items`
#[allow(dead_code)]
pub async fn mount_calendar_list(server: &MockServer, items: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/users/me/calendarList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "kind": "calendar#calendarList",
            "items": items
        })))
        .mount(server)
        .await;
}

/// Mounts `GET /calendars/{id}/events` returning `items`
#[allow(dead_code)]
pub async fn mount_events(server: &MockServer, calendar_id: &str, items: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/calendars/{calendar_id}/events")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "kind": "calendar#events",
            "items": items
        })))
        .mount(server)
        .await;
}
