use std::time::Duration;

use etalon_engine::{
    DeviceApi, DeviceEvent, DeviceSettings, EngineConfig, EngineHandle, FailureKind,
    HttpDeviceClient,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpDeviceClient {
    let settings = DeviceSettings {
        base_url: server.uri(),
        ..DeviceSettings::default()
    };
    HttpDeviceClient::new(&settings).expect("client builds")
}

#[tokio::test]
async fn list_parses_device_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/list"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[{"file":"cal-01","size":412},{"file":"cal-02","size":388}]"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let entries = client_for(&server).fetch_list().await.expect("list ok");
    let names: Vec<&str> = entries.iter().map(|e| e.file.as_str()).collect();
    assert_eq!(names, vec!["cal-01", "cal-02"]);
}

#[tokio::test]
async fn list_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/list"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_list().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn list_fails_on_malformed_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/list"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_list().await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::MalformedPayload));
}

#[tokio::test]
async fn create_posts_form_encoded_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reference"))
        .and(body_string("name=cal-01"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .create_reference("cal-01")
        .await
        .expect("create ok");
}

#[tokio::test]
async fn create_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reference"))
        .respond_with(ResponseTemplate::new(507))
        .mount(&server)
        .await;

    let err = client_for(&server).create_reference("cal-01").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(507));
}

#[tokio::test]
async fn upload_sends_multipart_file_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"ref-a.json\""))
        .and(body_string_contains(r#"{"points":[]}"#))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .upload_artifact("ref-a.json", br#"{"points":[]}"#.to_vec())
        .await
        .expect("upload ok");
}

#[tokio::test]
async fn upload_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .upload_artifact("ref-a.json", b"{}".to_vec())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn test_run_accepts_ok_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/test"))
        .and(body_string("file=cal-01"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"status":"ok"}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).run_test("cal-01").await.expect("test ok");
}

#[tokio::test]
async fn test_run_rejects_non_ok_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"status":"error"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).run_test("cal-01").await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TestRejected {
            status: "error".to_string()
        }
    );
}

#[tokio::test]
async fn test_run_fails_on_malformed_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/test"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("done", "text/plain"))
        .mount(&server)
        .await;

    let err = client_for(&server).run_test("cal-01").await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::MalformedPayload));
}

#[tokio::test]
async fn download_escapes_reference_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/download"))
        .and(query_param("file", "foo bar&baz"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"points":[1]}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let bytes = client_for(&server)
        .download_artifact("foo bar&baz")
        .await
        .expect("download ok");
    assert_eq!(bytes, br#"{"points":[1]}"#);
}

#[tokio::test]
async fn download_rejects_too_large_artifact() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/download"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/json")
                .insert_header("Content-Length", "11")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let settings = DeviceSettings {
        base_url: server.uri(),
        max_download_bytes: 10,
        ..DeviceSettings::default()
    };
    let client = HttpDeviceClient::new(&settings).expect("client builds");

    let err = client.download_artifact("big").await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn request_times_out_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_raw("[]", "application/json"),
        )
        .mount(&server)
        .await;

    let settings = DeviceSettings {
        base_url: server.uri(),
        request_timeout: Some(Duration::from_millis(50)),
        ..DeviceSettings::default()
    };
    let client = HttpDeviceClient::new(&settings).expect("client builds");

    let err = client.fetch_list().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[test]
fn rejects_invalid_base_url() {
    let settings = DeviceSettings {
        base_url: "not a url".to_string(),
        ..DeviceSettings::default()
    };
    let err = HttpDeviceClient::new(&settings).unwrap_err();
    assert!(matches!(err.kind, FailureKind::InvalidUrl));
}

async fn next_event(engine: &EngineHandle) -> DeviceEvent {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(event) = engine.try_recv() {
            return event;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "no engine event within deadline"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn engine_settles_commands_independently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_raw(r#"[{"file":"cal-01"}]"#, "application/json"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"status":"ok"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let temp = tempfile::TempDir::new().unwrap();
    let config = EngineConfig {
        settings: DeviceSettings {
            base_url: server.uri(),
            ..DeviceSettings::default()
        },
        download_dir: temp.path().to_path_buf(),
    };
    let engine = EngineHandle::new(config).expect("engine starts");

    // The slow list request is sent first but must not delay the test run.
    engine.fetch_list();
    engine.run_test("cal-01");

    let first = next_event(&engine).await;
    assert_eq!(
        first,
        DeviceEvent::TestSettled {
            request_id: 2,
            result: Ok(())
        }
    );

    let second = next_event(&engine).await;
    match second {
        DeviceEvent::ListFetched { request_id, result } => {
            assert_eq!(request_id, 1);
            let entries = result.expect("list ok");
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].file, "cal-01");
        }
        other => panic!("expected list settlement, got {other:?}"),
    }
}

#[tokio::test]
async fn engine_download_saves_artifact_to_disk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/download"))
        .and(query_param("file", "cal-01"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"points":[7]}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let temp = tempfile::TempDir::new().unwrap();
    let config = EngineConfig {
        settings: DeviceSettings {
            base_url: server.uri(),
            ..DeviceSettings::default()
        },
        download_dir: temp.path().to_path_buf(),
    };
    let engine = EngineHandle::new(config).expect("engine starts");

    engine.download("cal-01");

    match next_event(&engine).await {
        DeviceEvent::DownloadSettled { result, .. } => {
            let saved = result.expect("download ok");
            assert_eq!(saved.file_name().unwrap(), "cal-01.json");
            assert_eq!(std::fs::read_to_string(&saved).unwrap(), r#"{"points":[7]}"#);
        }
        other => panic!("expected download settlement, got {other:?}"),
    }
}
