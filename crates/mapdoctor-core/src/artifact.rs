// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Release artifact types.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{docs, Diagnostic, DiagnosticKind};
use crate::step::Step;

/// An uploaded release file, addressed by a `~`-rooted virtual path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
	/// Opaque identifier. The platform sends strings; numbers are accepted too.
	#[serde(deserialize_with = "string_or_number")]
	pub id: String,
	/// e.g. "~/static/js/main.js"
	pub name: String,
	#[serde(default)]
	pub dist: Option<String>,
	#[serde(default)]
	pub size: Option<u64>,
}

impl Artifact {
	pub fn new(id: impl Into<String>, name: impl Into<String>, dist: Option<&str>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			dist: dist.map(str::to_string),
			size: None,
		}
	}
}

/// Per-artifact metadata; only the stored HTTP headers matter here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
	#[serde(default)]
	pub headers: HashMap<String, String>,
}

impl ArtifactMetadata {
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());
		self
	}

	/// Header value if present and non-empty. Names are matched exactly.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.get(name)
			.map(String::as_str)
			.filter(|v| !v.is_empty())
	}
}

/// Strict distribution equality: absent only equals absent.
pub fn dist_matches(artifact_dist: Option<&str>, event_dist: Option<&str>) -> bool {
	artifact_dist == event_dist
}

/// Fail unless `artifact` was uploaded for the event's distribution.
pub fn verify_dist(
	artifact: &Artifact,
	event_dist: Option<&str>,
	step: Step,
) -> Result<(), Diagnostic> {
	if dist_matches(artifact.dist.as_deref(), event_dist) {
		return Ok(());
	}

	Err(Diagnostic::error(
		step,
		DiagnosticKind::DistMismatch,
		format!(
			"Release artifact distribution mismatch. Event: {}, Artifact: {}",
			display_dist(event_dist),
			display_dist(artifact.dist.as_deref()),
		),
	)
	.with_tip("Configure 'dist' option in the SDK to match the one used during artifacts upload.")
	.with_tip(docs::VERIFY_DIST))
}

fn display_dist(dist: Option<&str>) -> &str {
	dist.unwrap_or("<none>")
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Id {
		Str(String),
		Num(u64),
	}

	Ok(match Id::deserialize(deserializer)? {
		Id::Str(s) => s,
		Id::Num(n) => n.to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn deserializes_string_and_numeric_ids() {
		let json = r#"[
			{"id": "123", "name": "~/app.js", "dist": null, "size": 10, "headers": {}},
			{"id": 2, "name": "~/app.js.map", "dist": "D"}
		]"#;
		let artifacts: Vec<Artifact> = serde_json::from_str(json).unwrap();
		assert_eq!(artifacts[0].id, "123");
		assert_eq!(artifacts[0].dist, None);
		assert_eq!(artifacts[1].id, "2");
		assert_eq!(artifacts[1].dist.as_deref(), Some("D"));
	}

	#[test]
	fn metadata_ignores_empty_headers() {
		let meta = ArtifactMetadata::default()
			.with_header("Sourcemap", "")
			.with_header("X-SourceMap", "app.js.map");
		assert_eq!(meta.header("Sourcemap"), None);
		assert_eq!(meta.header("X-SourceMap"), Some("app.js.map"));
		assert_eq!(meta.header("x-sourcemap"), None);
	}

	#[test]
	fn null_artifact_dist_against_event_dist_fails() {
		let artifact = Artifact::new("1", "~/app.js", None);
		let err = verify_dist(&artifact, Some("abc"), Step::VerifySourceDist).unwrap_err();
		assert_eq!(err.kind, DiagnosticKind::DistMismatch);
		assert!(err.reason.contains("Event: abc"));
		assert!(err.reason.contains("Artifact: <none>"));
	}

	#[test]
	fn equal_dists_pass() {
		let artifact = Artifact::new("1", "~/app.js", Some("abc"));
		assert!(verify_dist(&artifact, Some("abc"), Step::VerifySourceDist).is_ok());
	}

	#[test]
	fn both_absent_pass() {
		let artifact = Artifact::new("1", "~/app.js", None);
		assert!(verify_dist(&artifact, None, Step::VerifySourceMapDist).is_ok());
	}

	#[test]
	fn artifact_dist_without_event_dist_fails() {
		let artifact = Artifact::new("1", "~/app.js", Some("abc"));
		assert!(verify_dist(&artifact, None, Step::VerifySourceDist).is_err());
	}

	proptest! {
		#[test]
		fn dist_match_is_plain_equality(
			a in proptest::option::of("[a-z0-9]{0,4}"),
			b in proptest::option::of("[a-z0-9]{0,4}"),
		) {
			prop_assert_eq!(dist_matches(a.as_deref(), b.as_deref()), a == b);
		}
	}
}
