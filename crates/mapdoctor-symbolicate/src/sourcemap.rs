// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map v3 parsing and position lookup.

use mapdoctor_core::{DecodeError, DecodedSourceMap, OriginalPosition, SourceMapDecoder};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{Result, SymbolicateError};
use crate::vlq::{decode_mappings, MappingTable};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSourceMap {
	version: u32,
	#[serde(default)]
	file: Option<String>,
	#[serde(default)]
	source_root: Option<String>,
	sources: Vec<Option<String>>,
	#[serde(default)]
	sources_content: Vec<Option<String>>,
	#[serde(default)]
	names: Vec<String>,
	mappings: String,
}

/// A decoded source map ready for lookups.
#[derive(Debug, Clone)]
pub struct ParsedSourceMap {
	pub file: Option<String>,
	/// Source paths with `sourceRoot` already applied.
	pub sources: Vec<String>,
	pub sources_content: Vec<Option<String>>,
	pub names: Vec<String>,
	mappings: MappingTable,
}

/// A lookup hit, with the original identifier when the map records one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
	pub position: OriginalPosition,
	pub name: Option<String>,
}

impl ParsedSourceMap {
	pub fn from_bytes(data: &[u8]) -> Result<Self> {
		let raw: RawSourceMap = serde_json::from_slice(data)?;

		if raw.version != 3 {
			return Err(SymbolicateError::InvalidVersion(raw.version));
		}

		let mappings = decode_mappings(&raw.mappings)?;
		let sources = raw
			.sources
			.into_iter()
			.map(|s| with_source_root(raw.source_root.as_deref(), &s.unwrap_or_default()))
			.collect::<Vec<_>>();

		debug!(
			sources = sources.len(),
			mappings = mappings.len(),
			"parsed source map"
		);

		Ok(Self {
			file: raw.file,
			sources,
			sources_content: raw.sources_content,
			names: raw.names,
			mappings,
		})
	}

	pub fn parse(data: &str) -> Result<Self> {
		Self::from_bytes(data.as_bytes())
	}

	/// Original position for a generated `line` (1-based) and `column` (0-based).
	pub fn lookup(&self, line: u32, column: u32) -> Result<Lookup> {
		let mapping = self
			.mappings
			.find(line.saturating_sub(1), column)
			.ok_or(SymbolicateError::NoMappingFound { line, column })?;

		let source = self
			.sources
			.get(mapping.source as usize)
			.ok_or(SymbolicateError::InvalidSourceIndex(mapping.source))?
			.clone();

		Ok(Lookup {
			position: OriginalPosition {
				source,
				line: mapping.original_line + 1,
				column: mapping.original_column,
			},
			name: mapping.name.and_then(|i| self.names.get(i as usize).cloned()),
		})
	}

	/// Embedded text of `source`, matched against the root-resolved paths.
	pub fn source_content(&self, source: &str) -> Result<&str> {
		self.sources
			.iter()
			.position(|s| s == source)
			.and_then(|idx| self.sources_content.get(idx))
			.and_then(|content| content.as_deref())
			.ok_or_else(|| SymbolicateError::MissingSourceContent(source.to_string()))
	}

	pub fn has_sources_content(&self) -> bool {
		self.sources_content.iter().any(Option::is_some)
	}

	pub fn mapping_count(&self) -> usize {
		self.mappings.len()
	}
}

/// Absolute sources such as `webpack:///src/app.ts` are kept as-is.
fn with_source_root(root: Option<&str>, source: &str) -> String {
	match root {
		Some(root) if !root.is_empty() && Url::parse(source).is_err() => {
			format!("{}/{}", root.trim_end_matches('/'), source)
		}
		_ => source.to_string(),
	}
}

impl DecodedSourceMap for ParsedSourceMap {
	fn original_position_for(&self, line: u32, column: u32) -> std::result::Result<OriginalPosition, DecodeError> {
		Ok(self.lookup(line, column)?.position)
	}

	fn source_content_for(&self, source: &str) -> std::result::Result<&str, DecodeError> {
		Ok(self.source_content(source)?)
	}
}

/// [`SourceMapDecoder`] backed by [`ParsedSourceMap`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceMapParser;

impl SourceMapDecoder for SourceMapParser {
	type Map = ParsedSourceMap;

	fn parse(&self, sourcemap: &str) -> std::result::Result<Self::Map, DecodeError> {
		Ok(ParsedSourceMap::parse(sourcemap)?)
	}
}
