//! Drive sink against a mock Drive API.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{any, body_json, body_string_contains, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use brightdata_client::{into_records, SnapshotRecord};
use drive_client::{DriveClient, StaticToken};
use social_snapshot::sink::{DriveSink, RecordSink};
use social_snapshot::Locator;

const FOLDER_QUERY: &str =
    "name = 'demo' and mimeType = 'application/vnd.google-apps.folder' and trashed = false";

fn drive(server: &MockServer) -> DriveClient {
    DriveClient::new(Arc::new(StaticToken("test-token".into())))
        .with_endpoints(&server.uri(), &format!("{}/upload", server.uri()))
}

fn rows() -> Vec<SnapshotRecord> {
    into_records(json!([{ "a": 1, "b": 2 }, { "a": 3, "b": 4 }]))
}

async fn mount_lookup(server: &MockServer, query: &str, files: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": files })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn clashing_name_gets_timestamp_suffix_and_is_shared() {
    let server = MockServer::start().await;

    mount_lookup(&server, FOLDER_QUERY, json!([{ "id": "F1", "name": "demo" }])).await;
    mount_lookup(
        &server,
        "name = 'rows.csv' and trashed = false and 'F1' in parents",
        json!([{ "id": "OLD", "name": "rows.csv" }]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .and(body_string_contains("\"name\":\"rows_20"))
        .and(body_string_contains(".csv\",\"parents\":[\"F1\"]"))
        .and(body_string_contains("a,b\n1,2\n3,4\n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "NEW" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/files/NEW/permissions"))
        .and(body_json(json!({
            "type": "user",
            "role": "writer",
            "emailAddress": "analyst@example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "P1" })))
        .expect(1)
        .mount(&server)
        .await;

    let sink = DriveSink::new(drive(&server)).with_share_with(Some("analyst@example.com".into()));
    let written = sink.write(&rows(), &Locator::new("demo", "rows")).await.unwrap();

    assert_eq!(written.len(), 1);
    assert_eq!(written[0].sink, "drive");
    assert_eq!(written[0].location, "drive:NEW");
}

#[tokio::test]
async fn missing_folder_is_created_under_parent() {
    let server = MockServer::start().await;

    mount_lookup(&server, &format!("{FOLDER_QUERY} and 'PARENT' in parents"), json!([])).await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(body_json(json!({
            "name": "demo",
            "mimeType": "application/vnd.google-apps.folder",
            "parents": ["PARENT"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "F9" })))
        .expect(1)
        .mount(&server)
        .await;

    mount_lookup(&server, "name = 'rows' and trashed = false and 'F9' in parents", json!([])).await;

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .and(body_string_contains(
            "{\"name\":\"rows\",\"mimeType\":\"application/vnd.google-apps.spreadsheet\",\"parents\":[\"F9\"]}",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "S1",
            "webViewLink": "https://docs.google.com/spreadsheets/d/S1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex("^/files/.*/permissions$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "P1" })))
        .expect(0)
        .mount(&server)
        .await;

    let sink = DriveSink::new(drive(&server))
        .with_parent_folder(Some("PARENT".into()))
        .as_spreadsheet(true);
    let written = sink.write(&rows(), &Locator::new("demo", "rows")).await.unwrap();

    assert_eq!(written[0].location, "https://docs.google.com/spreadsheets/d/S1");
}

#[tokio::test]
async fn empty_records_make_no_drive_calls() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let sink = DriveSink::new(drive(&server)).with_share_with(Some("analyst@example.com".into()));
    let written = sink.write(&[], &Locator::new("demo", "rows")).await.unwrap();

    assert!(written.is_empty());
}
