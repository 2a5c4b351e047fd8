// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map discovery for a generated file.
//!
//! Precedence is fixed: `Sourcemap` header, then `X-SourceMap` header, then
//! the last `sourceMappingURL` comment in the file.

use std::fmt;

use serde::Serialize;

use crate::artifact::ArtifactMetadata;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::step::Step;

const SOURCEMAP_HEADER: &str = "Sourcemap";
const X_SOURCEMAP_HEADER: &str = "X-SourceMap";
const COMMENT_PREAMBLES: [&str; 2] = ["//# sourceMappingURL=", "//@ sourceMappingURL="];
const PREAMBLE_LEN: usize = 21;
const INLINE_PREFIX: &str = "data:application/json";

/// Where the reference was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationOrigin {
	SourcemapHeader,
	XSourceMapHeader,
	Comment,
}

impl fmt::Display for LocationOrigin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::SourcemapHeader => write!(f, "{SOURCEMAP_HEADER} header"),
			Self::XSourceMapHeader => write!(f, "{X_SOURCEMAP_HEADER} header"),
			Self::Comment => write!(f, "sourceMappingURL comment"),
		}
	}
}

/// Declared location of a source map: an absolute URL or a relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceMapLocation {
	pub url: String,
	pub origin: LocationOrigin,
}

/// Result of scanning headers and file text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
	Found(SourceMapLocation),
	/// The reference is a `data:` URI.
	Inline,
	NotFound,
}

/// Apply the precedence rules without judging the outcome.
pub fn discover_source_map(file_text: &str, metadata: &ArtifactMetadata) -> Discovery {
	if let Some(url) = metadata.header(SOURCEMAP_HEADER) {
		return found(url, LocationOrigin::SourcemapHeader);
	}
	if let Some(url) = metadata.header(X_SOURCEMAP_HEADER) {
		return found(url, LocationOrigin::XSourceMapHeader);
	}

	let Some(candidate) = last_mapping_comment(file_text) else {
		return Discovery::NotFound;
	};

	if candidate.starts_with(INLINE_PREFIX) {
		Discovery::Inline
	} else if candidate.is_empty() {
		Discovery::NotFound
	} else {
		found(candidate, LocationOrigin::Comment)
	}
}

/// Discover the source map location or fail with a diagnostic.
pub fn locate_source_map(
	file_text: &str,
	metadata: &ArtifactMetadata,
) -> Result<SourceMapLocation, Diagnostic> {
	match discover_source_map(file_text, metadata) {
		Discovery::Found(location) => Ok(location),
		Discovery::Inline => Err(Diagnostic::warning(
			Step::LocateSourceMap,
			DiagnosticKind::UnsupportedInlineSourceMap,
			"Found inlined source maps, further verification is not supported for this scenario",
		)),
		Discovery::NotFound => Err(Diagnostic::error(
			Step::LocateSourceMap,
			DiagnosticKind::SourceMapUndiscoverable,
			"Failed to discover source maps url",
		)
		.with_tip(format!(
			"Neither a {SOURCEMAP_HEADER} nor an {X_SOURCEMAP_HEADER} header is stored for the file, and it does not end with a sourceMappingURL comment"
		))),
	}
}

fn found(url: &str, origin: LocationOrigin) -> Discovery {
	Discovery::Found(SourceMapLocation {
		url: url.to_string(),
		origin,
	})
}

// Scans from the end of the file; the first hit is the last comment.
fn last_mapping_comment(file_text: &str) -> Option<&str> {
	file_text.split('\n').rev().find_map(|line| {
		let preamble = line.get(..PREAMBLE_LEN)?;
		COMMENT_PREAMBLES
			.contains(&preamble)
			.then(|| line[PREAMBLE_LEN..].trim())
	})
}
