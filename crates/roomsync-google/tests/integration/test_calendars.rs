//! Integration tests for the calendar directory endpoints

use roomsync_core::{domain::SyncError, ports::CalendarProvider};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_list_calendars_parses_directory() {
    let (server, client) = common::setup_calendar_mock().await;

    Mock::given(method("GET"))
        .and(path("/users/me/calendarList"))
        .and(query_param("maxResults", "50"))
        .and(header("authorization", "Bearer test-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                { "id": "office@example.com", "summary": "Office", "primary": true },
                { "id": "casita@group.calendar.google.com", "summary": "Casita" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let calendars = client.list_calendars(50).await.expect("list failed");

    assert_eq!(calendars.len(), 2);
    assert!(calendars[0].is_primary);
    assert_eq!(calendars[1].id, "casita@group.calendar.google.com");
    assert_eq!(calendars[1].name, "Casita");
}

#[tokio::test]
async fn test_provider_list_calendars_uses_page_size() {
    let (server, client) = common::setup_calendar_mock().await;
    let provider = roomsync_google::provider::GoogleCalendarProvider::new(client)
        .with_page_sizes(7, 200);

    Mock::given(method("GET"))
        .and(path("/users/me/calendarList"))
        .and(query_param("maxResults", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let calendars = provider.list_calendars().await.expect("list failed");
    assert!(calendars.is_empty());
}

#[tokio::test]
async fn test_list_calendars_failure_is_directory_unavailable() {
    let (server, provider) = common::setup_provider_mock().await;

    Mock::given(method("GET"))
        .and(path("/users/me/calendarList"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(common::google_error(429, "rateLimitExceeded")),
        )
        .mount(&server)
        .await;

    let err = provider.list_calendars().await.unwrap_err();
    assert!(matches!(err, SyncError::DirectoryUnavailable(_)));
    assert!(err.is_pass_fatal());
}

#[tokio::test]
async fn test_insert_calendar_posts_summary() {
    let (server, provider) = common::setup_provider_mock().await;

    Mock::given(method("POST"))
        .and(path("/calendars"))
        .and(body_json(serde_json::json!({ "summary": "Casita" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "kind": "calendar#calendar",
            "id": "new-casita@group.calendar.google.com",
            "summary": "Casita"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = provider.insert_calendar("Casita").await.expect("insert failed");
    assert_eq!(record.id, "new-casita@group.calendar.google.com");
    assert_eq!(record.name, "Casita");
    assert!(!record.is_primary);
}

#[tokio::test]
async fn test_insert_calendar_usage_limit_is_quota_exceeded() {
    let (server, provider) = common::setup_provider_mock().await;

    Mock::given(method("POST"))
        .and(path("/calendars"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(common::google_error(403, "userRateLimitExceeded")),
        )
        .mount(&server)
        .await;

    let err = provider.insert_calendar("Casita").await.unwrap_err();
    assert!(err.is_quota_exceeded(), "got {err:?}");
}

#[tokio::test]
async fn test_insert_calendar_permission_denied_is_provider_error() {
    let (server, provider) = common::setup_provider_mock().await;

    Mock::given(method("POST"))
        .and(path("/calendars"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(common::google_error(403, "insufficientPermissions")),
        )
        .mount(&server)
        .await;

    let err = provider.insert_calendar("Casita").await.unwrap_err();
    assert!(matches!(err, SyncError::Provider(_)), "got {err:?}");
}
