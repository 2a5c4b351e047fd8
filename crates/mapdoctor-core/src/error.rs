// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Diagnostic taxonomy and collaborator error types.

use serde::Serialize;
use thiserror::Error;

use crate::step::Step;

/// Documentation links attached to diagnostics as remediation tips.
pub mod docs {
	pub const RELEASE: &str =
		"https://docs.sentry.io/platforms/javascript/configuration/options/#release";
	pub const VERIFY_RELEASE: &str = "https://docs.sentry.io/platforms/javascript/sourcemaps/troubleshooting_js/#verify-a-release-is-configured-in-your-sdk";
	pub const VERIFY_ARTIFACTS: &str = "https://docs.sentry.io/platforms/javascript/sourcemaps/troubleshooting_js/#verify-artifacts-are-uploaded";
	pub const VERIFY_ARTIFACT_NAMES: &str = "https://docs.sentry.io/platforms/javascript/sourcemaps/troubleshooting_js/#verify-artifact-names-match-stack-trace-frames";
	pub const URL_PREFIX: &str = "https://docs.sentry.io/product/cli/releases/#sentry-cli-sourcemaps";
	pub const VERIFY_DIST: &str = "https://docs.sentry.io/platforms/javascript/sourcemaps/troubleshooting_js/#verify-artifact-distribution-value-matches-value-configured-in-your-sdk";
}

/// Failure categories a diagnosis can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
	/// A required event or frame field is absent.
	MissingField,
	/// The frame's `abs_path` is not an absolute URL or has no file extension.
	MalformedFrame,
	/// The release has no artifacts, or none named like the reference.
	ArtifactNotFound,
	/// Artifact and event distribution tags differ.
	DistMismatch,
	/// Neither headers nor a trailing comment declare a source map.
	SourceMapUndiscoverable,
	/// The source map is inlined as a `data:` URI.
	UnsupportedInlineSourceMap,
	/// The decoder could not map the position or produce the original source.
	ResolutionFailure,
	/// The event was already source mapped by the platform.
	AlreadyMapped,
	/// A remote fetch failed.
	TransportError,
}

/// How a diagnostic should be presented. Both levels terminate the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	/// Nothing is broken, but there is nothing to map either.
	Warning,
	Error,
}

/// Terminal outcome of a failed pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{reason}")]
pub struct Diagnostic {
	pub step: Step,
	pub kind: DiagnosticKind,
	pub severity: Severity,
	pub reason: String,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub tips: Vec<String>,
}

impl Diagnostic {
	pub fn error(step: Step, kind: DiagnosticKind, reason: impl Into<String>) -> Self {
		Self {
			step,
			kind,
			severity: Severity::Error,
			reason: reason.into(),
			tips: Vec::new(),
		}
	}

	pub fn warning(step: Step, kind: DiagnosticKind, reason: impl Into<String>) -> Self {
		Self {
			severity: Severity::Warning,
			..Self::error(step, kind, reason)
		}
	}

	pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
		self.tips.push(tip.into());
		self
	}

	pub fn is_warning(&self) -> bool {
		self.severity == Severity::Warning
	}
}

/// Errors surfaced by a [`ReleaseApi`](crate::ReleaseApi) implementation.
#[derive(Debug, Error)]
pub enum FetchError {
	#[error("not found: {0}")]
	NotFound(String),

	#[error("unexpected status {status}: {body}")]
	Status { status: u16, body: String },

	#[error("transport error: {0}")]
	Transport(String),

	#[error("invalid response body: {0}")]
	Decode(String),
}

/// Error raised by a [`SourceMapDecoder`](crate::SourceMapDecoder).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DecodeError(pub String);

impl DecodeError {
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn warning_keeps_reason_and_kind() {
		let d = Diagnostic::warning(
			Step::VerifyException,
			DiagnosticKind::MissingField,
			"no exception",
		);
		assert!(d.is_warning());
		assert_eq!(d.kind, DiagnosticKind::MissingField);
		assert_eq!(d.to_string(), "no exception");
	}

	#[test]
	fn tips_accumulate_in_order() {
		let d = Diagnostic::error(Step::VerifyRelease, DiagnosticKind::MissingField, "x")
			.with_tip("first")
			.with_tip("second");
		assert_eq!(d.tips, vec!["first", "second"]);
	}

	#[test]
	fn serializes_with_snake_case_tags() {
		let d = Diagnostic::error(
			Step::LocateSourceMap,
			DiagnosticKind::UnsupportedInlineSourceMap,
			"inline",
		);
		let json = serde_json::to_value(&d).unwrap();
		assert_eq!(json["kind"], "unsupported_inline_source_map");
		assert_eq!(json["step"], "locate_source_map");
		assert_eq!(json["severity"], "error");
		assert!(json.get("tips").is_none());
	}
}
