// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generated-to-original position resolution through a source map decoder.

use serde::Serialize;
use tracing::debug;

use crate::error::{DecodeError, Diagnostic, DiagnosticKind};
use crate::step::Step;

/// Parses serialized source maps.
pub trait SourceMapDecoder: Send + Sync {
	type Map: DecodedSourceMap;

	fn parse(&self, sourcemap: &str) -> Result<Self::Map, DecodeError>;
}

/// A parsed source map that can answer position queries.
pub trait DecodedSourceMap {
	/// `line` is 1-based and `column` 0-based, in generated coordinates.
	fn original_position_for(&self, line: u32, column: u32) -> Result<OriginalPosition, DecodeError>;

	/// Full text of an original source, as embedded in the map.
	fn source_content_for(&self, source: &str) -> Result<&str, DecodeError>;
}

/// Original coordinates: 1-based line, 0-based column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OriginalPosition {
	pub source: String,
	pub line: u32,
	pub column: u32,
}

/// An original position together with the text of its source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPosition {
	pub source: String,
	pub line: u32,
	pub column: u32,
	#[serde(skip)]
	pub source_text: String,
}

/// Map a generated position to original source, or fail with a single
/// `ResolutionFailure` diagnostic whatever the decoder's complaint.
pub fn resolve_position<D: SourceMapDecoder + ?Sized>(
	decoder: &D,
	sourcemap: &str,
	line: u32,
	column: u32,
) -> Result<ResolvedPosition, Diagnostic> {
	decode(decoder, sourcemap, line, column).map_err(|e| {
		Diagnostic::error(
			Step::ResolvePosition,
			DiagnosticKind::ResolutionFailure,
			format!("Could not resolve source maps position: {e}"),
		)
	})
}

fn decode<D: SourceMapDecoder + ?Sized>(
	decoder: &D,
	sourcemap: &str,
	line: u32,
	column: u32,
) -> Result<ResolvedPosition, DecodeError> {
	let map = decoder.parse(sourcemap)?;
	let position = map.original_position_for(line, column)?;
	debug!(
		line,
		column,
		source = %position.source,
		original_line = position.line,
		original_column = position.column,
		"resolved original position"
	);
	let source_text = map.source_content_for(&position.source)?.to_string();

	Ok(ResolvedPosition {
		source: position.source,
		line: position.line,
		column: position.column,
		source_text,
	})
}
