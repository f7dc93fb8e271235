//! End-to-end job runs against a mock provider, writing to a temp dir.

use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use brightdata_client::BrightDataClient;
use social_snapshot::cli::{dispatch, Command, YoutubeCommand};
use social_snapshot::sink::{FileSink, RecordSink};
use social_snapshot::{Job, JobOutcome, PollOverride, Runner};

fn runner(server: &MockServer, out: &TempDir) -> Runner {
    let client = BrightDataClient::new("test-token").with_base_url(server.uri());
    let sinks: Vec<Box<dyn RecordSink>> = vec![Box::new(FileSink::new(out.path()))];
    Runner::new(client, sinks).with_poll_override(PollOverride {
        max_attempts: Some(3),
        interval: Some(Duration::from_millis(10)),
        ..Default::default()
    })
}

async fn mount_trigger(server: &MockServer, dataset_id: &str, snapshot_id: &str) {
    Mock::given(method("POST"))
        .and(path("/trigger"))
        .and(query_param("dataset_id", dataset_id))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "snapshot_id": snapshot_id })),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_snapshot(server: &MockServer, snapshot_id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/snapshot/{snapshot_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn instagram_posts_land_as_json_lines_and_csv() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_trigger(&server, "gd_lk5ns7kz21pck8jpis", "s_posts").await;
    mount_snapshot(
        &server,
        "s_posts",
        json!([
            { "shortcode": "abc", "likes": 10 },
            { "shortcode": "def", "likes": 20 }
        ]),
    )
    .await;

    let outcome = runner(&server, &out)
        .run(&Job::instagram_posts("nasa", 2))
        .await
        .unwrap();

    match outcome {
        JobOutcome::Written { records, outputs } => {
            assert_eq!(records, 2);
            assert_eq!(outputs.len(), 2);
        }
        other => panic!("expected written outcome, got {other:?}"),
    }

    let folder = out.path().join("instagram_data_nasa");
    let json = std::fs::read_to_string(folder.join("instagram_post_nasa_data.json")).unwrap();
    assert_eq!(
        json,
        "{\"shortcode\":\"abc\",\"likes\":10}\n{\"shortcode\":\"def\",\"likes\":20}\n"
    );
    let csv = std::fs::read_to_string(folder.join("instagram_post_nasa_data.csv")).unwrap();
    assert_eq!(csv, "shortcode,likes\nabc,10\ndef,20\n");
}

#[tokio::test]
async fn not_ready_writes_nothing() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_trigger(&server, "gd_lk5ns7kz21pck8jpis", "s_slow").await;
    mount_snapshot(&server, "s_slow", json!({ "status": "running" })).await;

    let outcome = runner(&server, &out)
        .run(&Job::instagram_posts("nasa", 2))
        .await
        .unwrap();

    assert_eq!(outcome, JobOutcome::NotReady);
    assert!(!out.path().join("instagram_data_nasa").exists());

    let polls = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert_eq!(polls, 3);
}

#[tokio::test]
async fn trigger_rejection_is_an_error_and_writes_nothing() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/trigger"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad dataset"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = runner(&server, &out)
        .run(&Job::linkedin_profile("satyanadella"))
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("bad dataset"));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn youtube_all_passes_channel_id_from_profile() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_trigger(&server, "gd_lk538t2k2p1k3oos71", "s_profile").await;
    mount_snapshot(
        &server,
        "s_profile",
        json!([{ "id": "UC_abc", "handle": "@mkbhd", "subscribers": 100 }]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/trigger"))
        .and(query_param("dataset_id", "gd_lk56epmy2i5g7lzu0k"))
        .and(body_json(json!([{
            "url": "https://www.youtube.com/channel/UC_abc",
            "num_of_posts": 2,
            "start_date": "",
            "end_date": ""
        }])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "snapshot_id": "s_videos" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_snapshot(
        &server,
        "s_videos",
        json!([{ "title": "one", "views": 5 }, { "title": "two", "views": 7 }]),
    )
    .await;

    let outcomes = dispatch(
        &runner(&server, &out),
        Command::Youtube {
            command: YoutubeCommand::All {
                handle: "mkbhd".into(),
                num_of_posts: 2,
                from_date: None,
                until_date: None,
            },
        },
    )
    .await
    .unwrap();

    assert_eq!(outcomes.len(), 2);
    let folder = out.path().join("youtube_mkbhd");
    assert!(folder.join("about.json").exists());
    let csv = std::fs::read_to_string(folder.join("youtube_channel_UC_abc_data.csv")).unwrap();
    assert_eq!(csv, "title,views\none,5\ntwo,7\n");
}

#[tokio::test]
async fn youtube_all_without_channel_id_fails() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_trigger(&server, "gd_lk538t2k2p1k3oos71", "s_profile").await;
    mount_snapshot(&server, "s_profile", json!([{ "handle": "@mkbhd" }])).await;

    let err = runner(&server, &out)
        .youtube_all("mkbhd", 2, None, None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("mkbhd"));
}
