// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pipeline steps and progress reporting.

use serde::Serialize;

use crate::error::Diagnostic;

/// One stage of the diagnostic pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
	FetchEvent,
	VerifyRelease,
	VerifyException,
	VerifyNotMapped,
	VerifyStacktrace,
	VerifyFramePath,
	FetchArtifacts,
	VerifyArtifacts,
	MatchSourceArtifact,
	VerifySourceDist,
	FetchSourceFile,
	FetchSourceMetadata,
	LocateSourceMap,
	MatchSourceMapArtifact,
	VerifySourceMapDist,
	FetchSourceMapFile,
	ResolvePosition,
}

impl Step {
	/// Progress text shown while the step runs.
	pub fn description(&self) -> &'static str {
		match self {
			Self::FetchEvent => "Fetching event",
			Self::VerifyRelease => "Verifying release name",
			Self::VerifyException => "Verifying event exception",
			Self::VerifyNotMapped => "Verifying event is not already source mapped",
			Self::VerifyStacktrace => "Verifying exception stacktrace",
			Self::VerifyFramePath => "Verifying exception stacktrace frames",
			Self::FetchArtifacts => "Fetching release artifacts",
			Self::VerifyArtifacts => "Verifying artifacts",
			Self::MatchSourceArtifact => "Verifying frame artifact",
			Self::VerifySourceDist => "Verifying frame artifact distribution",
			Self::FetchSourceFile => "Fetching frame artifact file",
			Self::FetchSourceMetadata => "Fetching frame artifact metadata",
			Self::LocateSourceMap => "Discovering source maps url",
			Self::MatchSourceMapArtifact => "Verifying source map artifact",
			Self::VerifySourceMapDist => "Verifying source map artifact distribution",
			Self::FetchSourceMapFile => "Fetching source map file",
			Self::ResolvePosition => "Resolving source maps position",
		}
	}
}

/// Receives progress notifications as the pipeline runs.
///
/// Implementations decide how progress is shown; the pipeline never writes
/// to the terminal itself.
pub trait StepObserver: Send + Sync {
	fn started(&self, step: Step);
	fn succeeded(&self, step: Step, message: &str);
	fn failed(&self, diagnostic: &Diagnostic);
}

/// Observer that discards all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
	fn started(&self, _step: Step) {}
	fn succeeded(&self, _step: Step, _message: &str) {}
	fn failed(&self, _diagnostic: &Diagnostic) {}
}
