//! Integration tests for fetching registrations

use roomsync_core::{domain::SyncError, ports::BookingSource};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_fetch_registrations_sends_window_and_token() {
    let (server, client) = common::setup_booking_mock().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/registrations"))
        .and(query_param("token", common::TEST_TOKEN))
        .and(query_param("limit", "0"))
        .and(query_param("min_stay", "2024-02-28"))
        .and(query_param("max_stay", "2024-09-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            common::registration(Some("Casita"), Some(12), "Ada"),
            common::registration(None, None, "Unassigned"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let reservations = client
        .fetch_registrations(&common::test_window())
        .await
        .expect("fetch failed");

    assert_eq!(reservations.len(), 2);
    assert_eq!(reservations[0].room, "Casita");
    assert_eq!(reservations[0].room_id, 12);
    assert_eq!(reservations[0].first_name, "Ada");
    assert_eq!(
        reservations[0].arrival_timeframe(),
        Some("Between 2:00 and 2:30")
    );
    assert_eq!(reservations[1].room, "");
    assert!(!reservations[1].is_assigned());
}

#[tokio::test]
async fn test_fetch_empty_array() {
    let (server, client) = common::setup_booking_mock().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/registrations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let reservations = client
        .fetch_reservations(&common::test_window())
        .await
        .expect("fetch failed");
    assert!(reservations.is_empty());
}

#[tokio::test]
async fn test_server_error_maps_to_source_unavailable() {
    let (server, client) = common::setup_booking_mock().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/registrations"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client
        .fetch_reservations(&common::test_window())
        .await
        .unwrap_err();

    match err {
        SyncError::SourceUnavailable(msg) => {
            assert!(msg.contains("500"), "message: {msg}");
            assert!(msg.contains("boom"), "message: {msg}");
        }
        other => panic!("expected SourceUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_maps_to_source_unavailable() {
    let (server, client) = common::setup_booking_mock().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/registrations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"an array\"}"))
        .mount(&server)
        .await;

    let err = client
        .fetch_reservations(&common::test_window())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::SourceUnavailable(_)));
    assert!(err.is_pass_fatal());
}

#[tokio::test]
async fn test_record_with_null_dates_is_skipped() {
    let (server, client) = common::setup_booking_mock().await;

    let mut dateless = common::registration(Some("Casita"), Some(12), "Nobody");
    dateless["start_date"] = serde_json::Value::Null;
    dateless["end_date"] = serde_json::Value::Null;

    Mock::given(method("GET"))
        .and(path("/api/v1/registrations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            common::registration(Some("Casita"), Some(12), "Ada"),
            dateless,
        ])))
        .mount(&server)
        .await;

    let reservations = client
        .fetch_reservations(&common::test_window())
        .await
        .expect("a single bad record must not fail the fetch");

    assert_eq!(reservations.len(), 1);
    assert_eq!(reservations[0].first_name, "Ada");
}

#[tokio::test]
async fn test_unreachable_host_maps_to_source_unavailable() {
    let client = roomsync_booking::client::BookingClient::with_base_url(
        "tok",
        "http://127.0.0.1:1/api/v1",
    );

    let err = client
        .fetch_reservations(&common::test_window())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::SourceUnavailable(_)));
}
