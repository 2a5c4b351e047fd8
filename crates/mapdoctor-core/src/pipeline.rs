// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The diagnostic pipeline.
//!
//! Steps run strictly in order and each owns one failure check. The first
//! failing step ends the run with its [`Diagnostic`]; nothing after it is
//! fetched or evaluated. Reaching the end yields a [`Resolution`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, instrument};
use url::Url;

use crate::artifact::{verify_dist, Artifact, ArtifactMetadata};
use crate::context::render_context;
use crate::error::{docs, Diagnostic, DiagnosticKind, FetchError};
use crate::event::{Event, ExceptionValue, Frame, Stacktrace};
use crate::locator::{locate_source_map, SourceMapLocation};
use crate::matcher::match_artifact;
use crate::resolver::{resolve_position, ResolvedPosition, SourceMapDecoder};
use crate::step::{NoopObserver, Step, StepObserver};

/// Remote data the pipeline needs from the error-tracking platform.
#[async_trait]
pub trait ReleaseApi: Send + Sync {
	async fn fetch_event(&self, event_id: &str) -> Result<Event, FetchError>;

	async fn fetch_release_artifacts(&self, release: &str) -> Result<Vec<Artifact>, FetchError>;

	/// Raw body of an artifact.
	async fn fetch_release_artifact_file(
		&self,
		release: &str,
		artifact: &Artifact,
	) -> Result<String, FetchError>;

	async fn fetch_release_artifact_file_metadata(
		&self,
		release: &str,
		artifact: &Artifact,
	) -> Result<ArtifactMetadata, FetchError>;
}

/// Optional checks layered on the standard flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
	/// Stop when the platform already source mapped the event.
	pub reject_already_mapped: bool,
	/// Select the frame from `raw_stacktrace` instead of `stacktrace`.
	pub use_raw_stacktrace: bool,
}

/// The frame the diagnosis was run against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSummary {
	pub abs_path: String,
	pub lineno: u32,
	pub colno: u32,
}

/// Successful end state of a diagnosis.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
	pub event_id: String,
	pub release: String,
	pub dist: Option<String>,
	pub frame: FrameSummary,
	pub source_artifact: Artifact,
	pub source_map_location: SourceMapLocation,
	pub source_map_artifact: Artifact,
	pub position: ResolvedPosition,
	/// Rendered source lines with the column marker.
	pub context: String,
}

/// Sequences the diagnostic steps over a [`ReleaseApi`] and a decoder.
pub struct Pipeline<A, D> {
	api: A,
	decoder: D,
	options: PipelineOptions,
	observer: Arc<dyn StepObserver>,
}

impl<A: ReleaseApi, D: SourceMapDecoder> Pipeline<A, D> {
	pub fn new(api: A, decoder: D) -> Self {
		Self {
			api,
			decoder,
			options: PipelineOptions::default(),
			observer: Arc::new(NoopObserver),
		}
	}

	pub fn with_options(mut self, options: PipelineOptions) -> Self {
		self.options = options;
		self
	}

	pub fn with_observer(mut self, observer: Arc<dyn StepObserver>) -> Self {
		self.observer = observer;
		self
	}

	pub fn api(&self) -> &A {
		&self.api
	}

	/// Diagnose one event.
	#[instrument(skip_all, fields(event_id = %event_id))]
	pub async fn run(&self, event_id: &str) -> Result<Resolution, Diagnostic> {
		self.begin(Step::FetchEvent);
		let event = self.finish(Step::FetchEvent, self.fetch_event(event_id).await, |_| {
			"Event fetched successfully".to_string()
		})?;

		self.begin(Step::VerifyRelease);
		let release = self.finish(Step::VerifyRelease, verify_release(&event), |r| {
			format!("Event has release name set to: {r}")
		})?;

		self.begin(Step::VerifyException);
		let exception = self.finish(Step::VerifyException, verify_exception(&event), |_| {
			"Event exception present".to_string()
		})?;

		if self.options.reject_already_mapped {
			self.begin(Step::VerifyNotMapped);
			self.finish(Step::VerifyNotMapped, verify_not_mapped(exception), |_| {
				"Event is not source mapped yet, proceeding".to_string()
			})?;
		}

		self.begin(Step::VerifyStacktrace);
		let stacktrace = self.finish(
			Step::VerifyStacktrace,
			verify_stacktrace(exception, self.options.use_raw_stacktrace),
			|_| "Event exception stacktrace present".to_string(),
		)?;

		self.begin(Step::VerifyFramePath);
		let frame = self.finish(Step::VerifyFramePath, verify_frame_path(stacktrace), |f| {
			format!("Event has a valid stacktrace frame: {}", f.abs_path)
		})?;

		self.begin(Step::FetchArtifacts);
		let artifacts = self.finish(
			Step::FetchArtifacts,
			self.fetch_artifacts(release).await,
			|a| format!("Fetched {} artifacts for release {release}", a.len()),
		)?;

		self.begin(Step::VerifyArtifacts);
		self.finish(Step::VerifyArtifacts, verify_artifacts(&artifacts), |_| {
			"Release has artifacts present".to_string()
		})?;

		self.begin(Step::MatchSourceArtifact);
		let source_artifact = self.finish(
			Step::MatchSourceArtifact,
			match_artifact(&artifacts, &frame.abs_path, Step::MatchSourceArtifact),
			|a| format!("Artifacts include frame file: {}", a.name),
		)?;

		self.begin(Step::VerifySourceDist);
		self.finish(
			Step::VerifySourceDist,
			verify_dist(source_artifact, event.dist(), Step::VerifySourceDist),
			|_| "Frame artifact distribution set correctly".to_string(),
		)?;

		self.begin(Step::FetchSourceFile);
		let file = self.finish(
			Step::FetchSourceFile,
			self.fetch_file(Step::FetchSourceFile, release, source_artifact)
				.await,
			|f| format!("Fetched {} ({} bytes)", source_artifact.name, f.len()),
		)?;

		self.begin(Step::FetchSourceMetadata);
		let metadata = self.finish(
			Step::FetchSourceMetadata,
			self.fetch_metadata(release, source_artifact).await,
			|m| format!("Fetched metadata with {} headers", m.headers.len()),
		)?;

		self.begin(Step::LocateSourceMap);
		let location = self.finish(
			Step::LocateSourceMap,
			locate_source_map(&file, &metadata),
			|l| format!("Source maps url discovered: {} (from {})", l.url, l.origin),
		)?;

		self.begin(Step::MatchSourceMapArtifact);
		let source_map_artifact = self.finish(
			Step::MatchSourceMapArtifact,
			match_artifact(&artifacts, &location.url, Step::MatchSourceMapArtifact),
			|a| format!("Artifacts include source map file: {}", a.name),
		)?;

		self.begin(Step::VerifySourceMapDist);
		self.finish(
			Step::VerifySourceMapDist,
			verify_dist(source_map_artifact, event.dist(), Step::VerifySourceMapDist),
			|_| "Source map artifact distribution set correctly".to_string(),
		)?;

		self.begin(Step::FetchSourceMapFile);
		let sourcemap = self.finish(
			Step::FetchSourceMapFile,
			self.fetch_file(Step::FetchSourceMapFile, release, source_map_artifact)
				.await,
			|f| format!("Fetched {} ({} bytes)", source_map_artifact.name, f.len()),
		)?;

		// Frames carry 1-based columns; decoders take 0-based ones.
		self.begin(Step::ResolvePosition);
		let position = self.finish(
			Step::ResolvePosition,
			resolve_position(
				&self.decoder,
				&sourcemap,
				frame.lineno,
				frame.colno.saturating_sub(1),
			),
			|p| format!("Source maps position resolved: {}:{}:{}", p.source, p.line, p.column),
		)?;

		let context = render_context(&position.source_text, position.line, position.column);
		info!(
			source = %position.source,
			line = position.line,
			column = position.column,
			"source map resolution succeeded"
		);

		Ok(Resolution {
			event_id: event_id.to_string(),
			release: release.to_string(),
			dist: event.dist.clone(),
			frame,
			source_artifact: source_artifact.clone(),
			source_map_location: location,
			source_map_artifact: source_map_artifact.clone(),
			position,
			context,
		})
	}

	fn begin(&self, step: Step) {
		debug!(?step, "step started");
		self.observer.started(step);
	}

	fn finish<T>(
		&self,
		step: Step,
		result: Result<T, Diagnostic>,
		message: impl FnOnce(&T) -> String,
	) -> Result<T, Diagnostic> {
		match &result {
			Ok(value) => self.observer.succeeded(step, &message(value)),
			Err(diagnostic) => {
				debug!(?step, kind = ?diagnostic.kind, reason = %diagnostic.reason, "step failed");
				self.observer.failed(diagnostic);
			}
		}
		result
	}

	async fn fetch_event(&self, event_id: &str) -> Result<Event, Diagnostic> {
		self.api
			.fetch_event(event_id)
			.await
			.map_err(|e| transport(Step::FetchEvent, format!("Could not retrieve event: {e}")))
	}

	async fn fetch_artifacts(&self, release: &str) -> Result<Vec<Artifact>, Diagnostic> {
		self.api.fetch_release_artifacts(release).await.map_err(|e| {
			transport(
				Step::FetchArtifacts,
				format!("Could not retrieve artifacts for {release}: {e}"),
			)
		})
	}

	async fn fetch_file(
		&self,
		step: Step,
		release: &str,
		artifact: &Artifact,
	) -> Result<String, Diagnostic> {
		self.api
			.fetch_release_artifact_file(release, artifact)
			.await
			.map_err(|e| {
				transport(
					step,
					format!(
						"Could not retrieve file {} from release {release}: {e}",
						artifact.name
					),
				)
			})
	}

	async fn fetch_metadata(
		&self,
		release: &str,
		artifact: &Artifact,
	) -> Result<ArtifactMetadata, Diagnostic> {
		self.api
			.fetch_release_artifact_file_metadata(release, artifact)
			.await
			.map_err(|e| {
				transport(
					Step::FetchSourceMetadata,
					format!(
						"Could not retrieve metadata of {} from release {release}: {e}",
						artifact.name
					),
				)
			})
	}
}

fn transport(step: Step, reason: String) -> Diagnostic {
	Diagnostic::error(step, DiagnosticKind::TransportError, reason)
}

fn verify_release(event: &Event) -> Result<&str, Diagnostic> {
	event.release().ok_or_else(|| {
		Diagnostic::error(
			Step::VerifyRelease,
			DiagnosticKind::MissingField,
			"Event is missing a release name",
		)
		.with_tip("Configure 'release' option in the SDK.")
		.with_tip(docs::RELEASE)
		.with_tip(docs::VERIFY_RELEASE)
	})
}

fn verify_exception(event: &Event) -> Result<&ExceptionValue, Diagnostic> {
	event.first_exception().ok_or_else(|| {
		Diagnostic::warning(
			Step::VerifyException,
			DiagnosticKind::MissingField,
			"Event has no exception captured, there is no use for source maps",
		)
	})
}

fn verify_not_mapped(exception: &ExceptionValue) -> Result<(), Diagnostic> {
	match exception.raw_stacktrace {
		Some(_) => Err(Diagnostic::warning(
			Step::VerifyNotMapped,
			DiagnosticKind::AlreadyMapped,
			"Event is already source mapped",
		)
		.with_tip("Run again with --raw-stacktrace to diagnose the unmapped frames")),
		None => Ok(()),
	}
}

fn verify_stacktrace(exception: &ExceptionValue, raw: bool) -> Result<&Stacktrace, Diagnostic> {
	let (stacktrace, label) = if raw {
		(exception.raw_stacktrace.as_ref(), "raw stacktrace")
	} else {
		(exception.stacktrace.as_ref(), "stacktrace")
	};

	stacktrace.ok_or_else(|| {
		Diagnostic::error(
			Step::VerifyStacktrace,
			DiagnosticKind::MissingField,
			format!("Event exception has no {label} available"),
		)
	})
}

fn verify_frame_path(stacktrace: &Stacktrace) -> Result<FrameSummary, Diagnostic> {
	let step = Step::VerifyFramePath;

	let frame = stacktrace.last_in_app_frame().ok_or_else(|| {
		Diagnostic::error(
			step,
			DiagnosticKind::MissingField,
			"Event exception stacktrace has no in_app frames",
		)
	})?;

	let abs_path = frame.abs_path.as_deref().unwrap_or_default();
	let url = Url::parse(abs_path).map_err(|_| {
		Diagnostic::error(
			step,
			DiagnosticKind::MalformedFrame,
			format!(
				"Event exception stacktrace top frame has incorrect abs_path (valid url is required). Found {abs_path}"
			),
		)
	})?;

	if !has_extension(url.path()) {
		return Err(Diagnostic::warning(
			step,
			DiagnosticKind::MalformedFrame,
			"Top frame of event exception originates from the <script> tag, it is not possible to resolve source maps",
		));
	}

	let (lineno, colno) = frame_position(frame).ok_or_else(|| {
		Diagnostic::error(
			step,
			DiagnosticKind::MissingField,
			format!("Event exception stacktrace top frame {abs_path} has no line or column number"),
		)
	})?;

	Ok(FrameSummary {
		abs_path: abs_path.to_string(),
		lineno,
		colno,
	})
}

fn frame_position(frame: &Frame) -> Option<(u32, u32)> {
	Some((frame.lineno?, frame.colno?))
}

fn verify_artifacts(artifacts: &[Artifact]) -> Result<(), Diagnostic> {
	if artifacts.is_empty() {
		return Err(Diagnostic::error(
			Step::VerifyArtifacts,
			DiagnosticKind::ArtifactNotFound,
			"Release has no artifacts uploaded",
		)
		.with_tip(docs::VERIFY_ARTIFACTS));
	}
	Ok(())
}

// Same rule as a path extname: a dot after the first character of the last segment.
fn has_extension(path: &str) -> bool {
	let base = path.rsplit('/').next().unwrap_or(path);
	matches!(base.rfind('.'), Some(idx) if idx > 0)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn frame(abs_path: Option<&str>, in_app: bool) -> Frame {
		Frame {
			abs_path: abs_path.map(str::to_string),
			lineno: Some(10),
			colno: Some(4),
			in_app: Some(in_app),
			..Frame::default()
		}
	}

	fn trace(frames: Vec<Frame>) -> Stacktrace {
		Stacktrace { frames }
	}

	#[test]
	fn extension_detection() {
		assert!(has_extension("/static/app.js"));
		assert!(has_extension("/app."));
		assert!(!has_extension("/"));
		assert!(!has_extension("/checkout"));
		assert!(!has_extension("/.hidden"));
		assert!(!has_extension("/v1.2/checkout"));
	}

	#[test]
	fn selects_last_in_app_frame() {
		let t = trace(vec![
			frame(Some("https://x.com/a.js"), true),
			frame(Some("https://x.com/b.js"), true),
			frame(Some("https://x.com/vendor.js"), false),
		]);
		let summary = verify_frame_path(&t).unwrap();
		assert_eq!(summary.abs_path, "https://x.com/b.js");
		assert_eq!((summary.lineno, summary.colno), (10, 4));
	}

	#[test]
	fn no_in_app_frames_is_missing_field() {
		let t = trace(vec![frame(Some("https://x.com/vendor.js"), false)]);
		let err = verify_frame_path(&t).unwrap_err();
		assert_eq!(err.kind, DiagnosticKind::MissingField);
	}

	#[test]
	fn relative_abs_path_is_malformed() {
		let t = trace(vec![frame(Some("/static/app.js"), true)]);
		let err = verify_frame_path(&t).unwrap_err();
		assert_eq!(err.kind, DiagnosticKind::MalformedFrame);
		assert!(err.reason.ends_with("Found /static/app.js"));
	}

	#[test]
	fn missing_abs_path_is_malformed() {
		let t = trace(vec![frame(None, true)]);
		assert_eq!(
			verify_frame_path(&t).unwrap_err().kind,
			DiagnosticKind::MalformedFrame
		);
	}

	#[test]
	fn script_tag_frame_is_warning() {
		let t = trace(vec![frame(Some("https://x.com/checkout"), true)]);
		let err = verify_frame_path(&t).unwrap_err();
		assert_eq!(err.kind, DiagnosticKind::MalformedFrame);
		assert!(err.is_warning());
	}

	#[test]
	fn frame_without_position_is_missing_field() {
		let mut f = frame(Some("https://x.com/a.js"), true);
		f.colno = None;
		let err = verify_frame_path(&trace(vec![f])).unwrap_err();
		assert_eq!(err.kind, DiagnosticKind::MissingField);
	}

	#[test]
	fn raw_stacktrace_selection() {
		let exception = ExceptionValue {
			stacktrace: Some(trace(vec![frame(Some("https://x.com/a.js"), true)])),
			raw_stacktrace: None,
			..ExceptionValue::default()
		};
		assert!(verify_stacktrace(&exception, false).is_ok());
		let err = verify_stacktrace(&exception, true).unwrap_err();
		assert_eq!(err.reason, "Event exception has no raw stacktrace available");
	}

	#[test]
	fn already_mapped_detection() {
		let exception = ExceptionValue {
			raw_stacktrace: Some(Stacktrace::default()),
			..ExceptionValue::default()
		};
		let err = verify_not_mapped(&exception).unwrap_err();
		assert_eq!(err.kind, DiagnosticKind::AlreadyMapped);
		assert!(verify_not_mapped(&ExceptionValue::default()).is_ok());
	}
}
