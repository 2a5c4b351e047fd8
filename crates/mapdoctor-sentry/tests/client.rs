// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use mapdoctor_common_secret::SecretString;
use mapdoctor_config::ApiConfig;
use mapdoctor_core::{Artifact, FetchError, ReleaseApi};
use mapdoctor_sentry::SentryClient;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PREFIX: &str = "/api/0/projects/acme/web";

fn client(server: &MockServer) -> SentryClient {
	let config = ApiConfig {
		base_url: Url::parse(&format!("{}/api/0/", server.uri())).unwrap(),
		organization: "acme".to_string(),
		project: "web".to_string(),
		auth_token: SecretString::new("sntrys_test".to_string()),
		timeout: Duration::from_secs(5),
	};
	SentryClient::new(&config).unwrap()
}

#[tokio::test]
async fn fetches_event_with_bearer_token() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(format!("{PREFIX}/events/abc123/json/")))
		.and(header("Authorization", "Bearer sntrys_test"))
		.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
			"eventID": "abc123",
			"release": "web@1.0.0",
			"dist": null,
			"exception": {"values": [{"type": "TypeError", "stacktrace": {"frames": []}}]}
		})))
		.expect(1)
		.mount(&server)
		.await;

	let event = client(&server).fetch_event("abc123").await.unwrap();
	assert_eq!(event.event_id.as_deref(), Some("abc123"));
	assert_eq!(event.release(), Some("web@1.0.0"));
	assert!(event.first_exception().is_some());
}

#[tokio::test]
async fn lists_release_artifacts() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(format!("{PREFIX}/releases/web@1.0.0/files/")))
		.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
			{"id": "1", "name": "~/static/app.js", "dist": null, "size": 120, "sha1": "x"},
			{"id": 2, "name": "~/static/app.js.map", "dist": "ios"}
		])))
		.mount(&server)
		.await;

	let artifacts = client(&server)
		.fetch_release_artifacts("web@1.0.0")
		.await
		.unwrap();
	assert_eq!(artifacts.len(), 2);
	assert_eq!(artifacts[0].size, Some(120));
	assert_eq!(artifacts[1].id, "2");
	assert_eq!(artifacts[1].dist.as_deref(), Some("ios"));
}

#[tokio::test]
async fn downloads_file_body_and_metadata() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(format!("{PREFIX}/releases/R/files/7/")))
		.and(query_param("download", "1"))
		.respond_with(
			ResponseTemplate::new(200).set_body_string("x();\n//# sourceMappingURL=app.js.map"),
		)
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path(format!("{PREFIX}/releases/R/files/7/")))
		.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
			"id": "7",
			"name": "~/app.js",
			"headers": {"Sourcemap": "app.js.map"}
		})))
		.mount(&server)
		.await;

	let client = client(&server);
	let artifact = Artifact::new("7", "~/app.js", None);

	let body = client
		.fetch_release_artifact_file("R", &artifact)
		.await
		.unwrap();
	assert!(body.ends_with("sourceMappingURL=app.js.map"));

	let metadata = client
		.fetch_release_artifact_file_metadata("R", &artifact)
		.await
		.unwrap();
	assert_eq!(metadata.header("Sourcemap"), Some("app.js.map"));
}

#[tokio::test]
async fn not_found_maps_to_not_found() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(404).set_body_string("{\"detail\":\"missing\"}"))
		.mount(&server)
		.await;

	let err = client(&server).fetch_event("nope").await.unwrap_err();
	assert!(matches!(err, FetchError::NotFound(_)));
}

#[tokio::test]
async fn server_error_keeps_status_and_body() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
		.expect(1)
		.mount(&server)
		.await;

	let err = client(&server)
		.fetch_release_artifacts("R")
		.await
		.unwrap_err();
	match err {
		FetchError::Status { status, body } => {
			assert_eq!(status, 403);
			assert_eq!(body, "forbidden");
		}
		other => panic!("unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn invalid_json_is_decode_error() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
		.mount(&server)
		.await;

	let err = client(&server).fetch_event("abc").await.unwrap_err();
	assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
	let server = MockServer::start().await;
	let client = client(&server);
	drop(server);

	let err = client.fetch_event("abc").await.unwrap_err();
	assert!(matches!(err, FetchError::Transport(_)));
}
