//! End-to-end runs of the binary against a mocked App Automate API.
//!
//! The config file points `api_url` at the mock server and shortens the poll
//! interval to one second.

#![allow(clippy::expect_used)]

use std::process::Output;

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::cli_tests::{Artifacts, xcui_runner};

async fn mount_uploads(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/xcuitest/v2/app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"app_url": "bs://app"})))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/xcuitest/v2/test-suite"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"test_suite_url": "bs://suite"})),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_uploads_and_trigger(server: &MockServer) {
    mount_uploads(server).await;
    Mock::given(method("POST"))
        .and(path("/xcuitest/v2/build"))
        .and(body_partial_json(json!({
            "app": "bs://app",
            "testSuite": "bs://suite",
            "devices": ["iPhone 12-14", "iPad Air 4-14"],
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Success", "build_id": "b1"})),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_statuses(server: &MockServer, first: &str, then: &str) {
    Mock::given(method("GET"))
        .and(path("/xcuitest/v2/builds/b1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": first})))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/xcuitest/v2/builds/b1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": then})))
        .mount(server)
        .await;
}

fn write_config(artifacts: &Artifacts, server: &MockServer, extra: &str) {
    let config = format!(
        "api_url: {uri}\ndashboard_url: {uri}/dashboard\npoll_interval_secs: 1\n{extra}",
        uri = server.uri()
    );
    std::fs::write(artifacts.dir.path().join("config.yaml"), config).expect("write config");
}

async fn run_binary(args: Vec<String>) -> Output {
    tokio::task::spawn_blocking(move || xcui_runner().args(args).output().expect("spawn"))
        .await
        .expect("blocking task")
}

#[tokio::test(flavor = "multi_thread")]
async fn test_passed_build_exits_zero_and_prints_dashboard_url() {
    let server = MockServer::start().await;
    mount_uploads_and_trigger(&server).await;
    mount_statuses(&server, "running", "passed").await;
    let artifacts = Artifacts::new();
    write_config(&artifacts, &server, "");

    let output = run_binary(artifacts.run_args("iPhone 12-14, iPad Air 4-14")).await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains(&format!(
        "Browserstack xcui build: {}/dashboard/b1 finished successfully",
        server.uri()
    )));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_json_summary_on_stdout() {
    let server = MockServer::start().await;
    mount_uploads_and_trigger(&server).await;
    mount_statuses(&server, "queued", "passed").await;
    let artifacts = Artifacts::new();
    write_config(&artifacts, &server, "");

    let mut args = artifacts.run_args("iPhone 12-14, iPad Air 4-14");
    args.push("--json".into());
    let output = run_binary(args).await;

    assert_eq!(output.status.code(), Some(0));
    let summary: Value = serde_json::from_slice(&output.stdout).expect("json summary");
    assert_eq!(summary["build_id"], "b1");
    assert_eq!(summary["status"], "passed");
    assert_eq!(summary["polls"], 2);
    assert_eq!(summary["local"], false);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_single_device_passes_after_two_polls() {
    let server = MockServer::start().await;
    mount_uploads(&server).await;
    Mock::given(method("POST"))
        .and(path("/xcuitest/v2/build"))
        .and(body_partial_json(json!({"devices": ["iPhone 12"]})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Success", "build_id": "b1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_statuses(&server, "running", "passed").await;
    let artifacts = Artifacts::new();
    write_config(&artifacts, &server, "");

    let mut args = artifacts.run_args("iPhone 12");
    args.push("--json".into());
    let output = run_binary(args).await;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let summary: Value = serde_json::from_slice(&output.stdout).expect("json summary");
    assert_eq!(summary["devices"], json!(["iPhone 12"]));
    assert_eq!(summary["status"], "passed");
    assert_eq!(summary["polls"], 2);

    let requests = server.received_requests().await.expect("recorded requests");
    let trigger = requests
        .iter()
        .find(|r| r.url.path() == "/xcuitest/v2/build")
        .expect("trigger request");
    let body: Value = serde_json::from_slice(&trigger.body).expect("trigger body");
    assert_eq!(body["devices"], json!(["iPhone 12"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_build_exits_nonzero() {
    let server = MockServer::start().await;
    mount_uploads_and_trigger(&server).await;
    mount_statuses(&server, "running", "failed").await;
    let artifacts = Artifacts::new();
    write_config(&artifacts, &server, "");

    let output = run_binary(artifacts.run_args("iPhone 12-14, iPad Air 4-14")).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .contains("XCUI build: b1 failed with status: failed")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_timeout_exits_nonzero_with_timeout_code() {
    let server = MockServer::start().await;
    mount_uploads_and_trigger(&server).await;
    mount_statuses(&server, "running", "running").await;
    let artifacts = Artifacts::new();
    write_config(&artifacts, &server, "timeout_secs: 1\n");

    let mut args = artifacts.run_args("iPhone 12-14, iPad Air 4-14");
    args.push("--json".into());
    let output = run_binary(args).await;

    assert_eq!(output.status.code(), Some(1));
    let error: Value = serde_json::from_slice(&output.stdout).expect("json error");
    assert_eq!(error["code"], "timeout");
    assert_eq!(error["message"], "XCUI build: b1 timeout: 1s");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_upload_never_triggers_build() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/xcuitest/v2/app"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Unauthorized"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/xcuitest/v2/build"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let artifacts = Artifacts::new();
    write_config(&artifacts, &server, "");

    let output = run_binary(artifacts.run_args("iPhone 12-14")).await;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("HTTP 401"));
    assert!(stderr.contains("MyApp.ipa"));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_local_tunnel_wraps_the_build() {
    use std::os::unix::fs::PermissionsExt;

    let server = MockServer::start().await;
    mount_uploads(&server).await;
    Mock::given(method("POST"))
        .and(path("/xcuitest/v2/build"))
        .and(body_partial_json(json!({
            "browserstack.local": "true",
            "browserstack.localIdentifier": "ci-1",
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Success", "build_id": "b1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_statuses(&server, "running", "passed").await;

    let artifacts = Artifacts::new();
    let calls = artifacts.dir.path().join("calls.log");
    let binary = artifacts.dir.path().join("BrowserStackLocal");
    let script = format!(
        "#!/bin/sh\necho \"$*\" >> '{}'\ncase \"$*\" in\n  *\"--daemon start\"*) echo '{{\"state\":\"connected\",\"pid\":4242}}' ;;\n  *) echo '{{\"status\":\"success\"}}' ;;\nesac\n",
        calls.display()
    );
    std::fs::write(&binary, script).expect("write fake binary");
    std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    write_config(&artifacts, &server, "");

    let mut args = artifacts.run_args("iPhone 12-14, iPad Air 4-14");
    args.extend([
        "--local-key".to_string(),
        "local-key".to_string(),
        "--local-identifier".to_string(),
        "ci-1".to_string(),
        "--local-binary".to_string(),
        binary.display().to_string(),
    ]);
    let output = run_binary(args).await;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let log = std::fs::read_to_string(&calls).expect("calls log");
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("--key local-key --daemon start --log-file "));
    assert!(lines[0].ends_with("--local-identifier ci-1"));
    assert_eq!(lines[1], "--key local-key --daemon stop --local-identifier ci-1");
}
