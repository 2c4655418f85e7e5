//! Integration tests for reloading the access token between passes

use roomsync_core::{config::CalendarConfig, ports::CalendarProvider};
use roomsync_google::provider::GoogleCalendarProvider;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_token(path: &std::path::Path, token: &str) {
    std::fs::write(path, serde_json::json!({ "access_token": token }).to_string()).unwrap();
}

async fn mount_list_for_token(server: &MockServer, token: &str, summary: &str) {
    Mock::given(method("GET"))
        .and(path("/users/me/calendarList"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{ "id": "cal-1", "summary": summary }]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_renewed_token_file_is_used_after_refresh() {
    let server = MockServer::start().await;
    let token_file = tempfile::NamedTempFile::new().unwrap();
    write_token(token_file.path(), "first-token");

    let config = CalendarConfig {
        base_url: server.uri(),
        token_file: token_file.path().to_path_buf(),
        ..CalendarConfig::default()
    };
    let provider = GoogleCalendarProvider::from_config(&config).expect("provider");

    mount_list_for_token(&server, "first-token", "Before").await;
    mount_list_for_token(&server, "second-token", "After").await;

    provider.refresh_credentials().await.unwrap();
    let before = provider.list_calendars().await.unwrap();
    assert_eq!(before[0].name, "Before");

    write_token(token_file.path(), "second-token");
    provider.refresh_credentials().await.unwrap();
    let after = provider.list_calendars().await.unwrap();
    assert_eq!(after[0].name, "After");
}

#[tokio::test]
async fn test_unreadable_token_file_keeps_current_token() {
    let server = MockServer::start().await;
    let token_file = tempfile::NamedTempFile::new().unwrap();
    write_token(token_file.path(), "first-token");

    let config = CalendarConfig {
        base_url: server.uri(),
        token_file: token_file.path().to_path_buf(),
        ..CalendarConfig::default()
    };
    let provider = GoogleCalendarProvider::from_config(&config).expect("provider");

    std::fs::write(token_file.path(), "not json").unwrap();
    assert!(provider.refresh_credentials().await.is_err());
    assert_eq!(provider.client().access_token(), "first-token");
}
