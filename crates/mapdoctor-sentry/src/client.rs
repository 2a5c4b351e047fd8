// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use mapdoctor_common_secret::SecretString;
use mapdoctor_config::ApiConfig;
use mapdoctor_core::{Artifact, ArtifactMetadata, Event, FetchError, ReleaseApi};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{Result, SentryClientError};

/// Client for the project-scoped Sentry endpoints.
///
/// Every request carries the bearer token. Failures are returned as-is;
/// nothing is retried.
pub struct SentryClient {
	base_url: Url,
	organization: String,
	project: String,
	http: reqwest::Client,
	auth_token: SecretString,
}

impl SentryClient {
	pub fn new(config: &ApiConfig) -> Result<Self> {
		if config.base_url.cannot_be_a_base() {
			return Err(SentryClientError::InvalidBaseUrl(
				config.base_url.to_string(),
			));
		}

		let http = mapdoctor_common_http::new_client_with_timeout(config.timeout)?;
		Ok(Self {
			base_url: config.base_url.clone(),
			organization: config.organization.clone(),
			project: config.project.clone(),
			http,
			auth_token: config.auth_token.clone(),
		})
	}

	/// `{base}/projects/{org}/{project}/{segments...}/`, each segment encoded.
	fn endpoint(&self, segments: &[&str]) -> Url {
		let mut url = self.base_url.clone();
		if let Ok(mut path) = url.path_segments_mut() {
			path.pop_if_empty()
				.push("projects")
				.push(&self.organization)
				.push(&self.project)
				.extend(segments)
				.push("");
		}
		url
	}

	fn release_files(&self, release: &str, rest: &[&str]) -> Url {
		let mut segments = vec!["releases", release, "files"];
		segments.extend_from_slice(rest);
		self.endpoint(&segments)
	}

	async fn get(&self, url: Url) -> std::result::Result<Response, FetchError> {
		debug!(%url, "GET");
		let response = self
			.http
			.get(url.clone())
			.bearer_auth(self.auth_token.expose())
			.send()
			.await
			.map_err(|e| FetchError::Transport(e.to_string()))?;

		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}

		let body = response.text().await.unwrap_or_default();
		debug!(%url, status = status.as_u16(), "request failed");
		if status == StatusCode::NOT_FOUND {
			return Err(FetchError::NotFound(url.path().to_string()));
		}
		Err(FetchError::Status {
			status: status.as_u16(),
			body,
		})
	}

	async fn get_json<T: DeserializeOwned>(&self, url: Url) -> std::result::Result<T, FetchError> {
		let body = self
			.get(url)
			.await?
			.bytes()
			.await
			.map_err(|e| FetchError::Transport(e.to_string()))?;
		serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
	}
}

#[async_trait]
impl ReleaseApi for SentryClient {
	#[instrument(skip(self))]
	async fn fetch_event(&self, event_id: &str) -> std::result::Result<Event, FetchError> {
		self.get_json(self.endpoint(&["events", event_id, "json"]))
			.await
	}

	#[instrument(skip(self))]
	async fn fetch_release_artifacts(
		&self,
		release: &str,
	) -> std::result::Result<Vec<Artifact>, FetchError> {
		self.get_json(self.release_files(release, &[])).await
	}

	#[instrument(skip(self, artifact), fields(artifact = %artifact.name))]
	async fn fetch_release_artifact_file(
		&self,
		release: &str,
		artifact: &Artifact,
	) -> std::result::Result<String, FetchError> {
		let mut url = self.release_files(release, &[artifact.id.as_str()]);
		url.query_pairs_mut().append_pair("download", "1");
		self.get(url)
			.await?
			.text()
			.await
			.map_err(|e| FetchError::Transport(e.to_string()))
	}

	#[instrument(skip(self, artifact), fields(artifact = %artifact.name))]
	async fn fetch_release_artifact_file_metadata(
		&self,
		release: &str,
		artifact: &Artifact,
	) -> std::result::Result<ArtifactMetadata, FetchError> {
		self.get_json(self.release_files(release, &[artifact.id.as_str()]))
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	fn config(base_url: &str) -> ApiConfig {
		ApiConfig {
			base_url: Url::parse(base_url).unwrap(),
			organization: "acme".to_string(),
			project: "web".to_string(),
			auth_token: SecretString::new("token".to_string()),
			timeout: Duration::from_secs(5),
		}
	}

	#[test]
	fn endpoint_appends_to_base_path() {
		let client = SentryClient::new(&config("https://sentry.io/api/0/")).unwrap();
		assert_eq!(
			client.endpoint(&["events", "abc", "json"]).as_str(),
			"https://sentry.io/api/0/projects/acme/web/events/abc/json/"
		);
	}

	#[test]
	fn endpoint_without_trailing_slash_base() {
		let client = SentryClient::new(&config("https://self.hosted/api/0")).unwrap();
		assert_eq!(
			client.release_files("1.0", &[]).as_str(),
			"https://self.hosted/api/0/projects/acme/web/releases/1.0/files/"
		);
	}

	#[test]
	fn release_names_are_encoded() {
		let client = SentryClient::new(&config("https://sentry.io/api/0/")).unwrap();
		let url = client.release_files("web@1.0 beta/2", &["7"]);
		assert_eq!(
			url.path(),
			"/api/0/projects/acme/web/releases/web@1.0%20beta%2F2/files/7/"
		);
	}

	#[test]
	fn rejects_opaque_base_url() {
		let result = SentryClient::new(&config("mailto:ops@example.com"));
		assert!(matches!(result, Err(SentryClientError::InvalidBaseUrl(_))));
	}
}
