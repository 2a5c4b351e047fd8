// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Matching frame URLs and source map references against artifact names.
//!
//! Artifacts are named by virtual paths under [`VIRTUAL_ROOT`]. A reference
//! (absolute URL or relative path) is reduced to its path, stripped of any
//! query or fragment, and joined onto the root to form the canonical key.
//! Only an exact name match resolves; a basename-only match is reported as a
//! hint but never used.

use tracing::debug;
use url::Url;

use crate::artifact::Artifact;
use crate::error::{docs, Diagnostic, DiagnosticKind};
use crate::step::Step;

/// Root marker every artifact name starts with.
pub const VIRTUAL_ROOT: &str = "~";

/// Outcome of looking a reference up in the artifact list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactMatch<'a> {
	Exact(&'a Artifact),
	/// No exact match, but an artifact shares the key's basename.
	Partial(&'a Artifact),
	Missing,
}

/// Canonical lookup key for a frame URL or source map reference.
///
/// `https://cdn.example.com/static/app.js?v=3` becomes `~/static/app.js`;
/// `app.js.map` becomes `~/app.js.map`.
pub fn canonical_key(reference: &str) -> String {
	let path = match Url::parse(reference) {
		Ok(url) => url.path().to_string(),
		Err(_) => strip_query(reference).to_string(),
	};
	join_root(&path)
}

/// Look `reference` up by canonical key.
///
/// When several artifacts share the basename only the first one is
/// reported as the partial match.
pub fn find_artifact<'a>(artifacts: &'a [Artifact], reference: &str) -> ArtifactMatch<'a> {
	let key = canonical_key(reference);

	if let Some(artifact) = artifacts.iter().find(|a| a.name == key) {
		return ArtifactMatch::Exact(artifact);
	}

	let base = basename(&key);
	match artifacts.iter().find(|a| a.name.ends_with(base)) {
		Some(artifact) => ArtifactMatch::Partial(artifact),
		None => ArtifactMatch::Missing,
	}
}

/// Resolve `reference` to an artifact or explain why it can't be.
pub fn match_artifact<'a>(
	artifacts: &'a [Artifact],
	reference: &str,
	step: Step,
) -> Result<&'a Artifact, Diagnostic> {
	let key = canonical_key(reference);
	debug!(reference, key = %key, candidates = artifacts.len(), "matching artifact");

	let partial = match find_artifact(artifacts, reference) {
		ArtifactMatch::Exact(artifact) => return Ok(artifact),
		ArtifactMatch::Partial(artifact) => Some(artifact),
		ArtifactMatch::Missing => None,
	};

	let mut diagnostic = Diagnostic::error(
		step,
		DiagnosticKind::ArtifactNotFound,
		format!("Artifacts do not include entry: {key}"),
	);

	if let Some(candidate) = partial {
		diagnostic = diagnostic
			.with_tip(format!(
				"Found entry with matching filename: {}",
				candidate.name
			))
			.with_tip(format!(
				"Make sure that --url-prefix is set to: {} and not {}",
				dirname(&key),
				dirname(&candidate.name)
			))
			.with_tip(docs::URL_PREFIX);
	}

	Err(diagnostic.with_tip(docs::VERIFY_ARTIFACT_NAMES))
}

fn strip_query(reference: &str) -> &str {
	match reference.find(['?', '#']) {
		Some(idx) => &reference[..idx],
		None => reference,
	}
}

// Collapses empty and `.` segments; `..` never climbs above the root.
fn join_root(path: &str) -> String {
	let mut segments: Vec<&str> = Vec::new();
	for segment in path.split('/') {
		match segment {
			"" | "." => {}
			".." => {
				segments.pop();
			}
			s => segments.push(s),
		}
	}

	if segments.is_empty() {
		VIRTUAL_ROOT.to_string()
	} else {
		format!("{VIRTUAL_ROOT}/{}", segments.join("/"))
	}
}

fn basename(key: &str) -> &str {
	key.rsplit('/').next().unwrap_or(key)
}

fn dirname(name: &str) -> &str {
	match name.rfind('/') {
		Some(0) => "/",
		Some(idx) => &name[..idx],
		None => ".",
	}
}
