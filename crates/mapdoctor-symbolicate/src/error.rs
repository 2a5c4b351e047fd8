// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for source map decoding.

use mapdoctor_core::DecodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SymbolicateError {
	#[error("Invalid source map JSON: {0}")]
	InvalidJson(#[from] serde_json::Error),

	#[error("Invalid source map version: expected 3, got {0}")]
	InvalidVersion(u32),

	#[error("Invalid VLQ character: {0:?}")]
	InvalidVlqChar(char),

	#[error("VLQ value overflows 32 bits")]
	VlqOverflow,

	#[error("VLQ segment ends in a continuation digit")]
	TruncatedSegment,

	#[error("Mapping segment has {0} fields, expected 1, 4 or 5")]
	InvalidSegmentLength(usize),

	#[error("Mapping references source index {0} outside the sources list")]
	InvalidSourceIndex(u32),

	#[error("No mapping found for line {line}, column {column}")]
	NoMappingFound { line: u32, column: u32 },

	#[error("Original source content not available for {0}")]
	MissingSourceContent(String),
}

pub type Result<T> = std::result::Result<T, SymbolicateError>;

impl From<SymbolicateError> for DecodeError {
	fn from(err: SymbolicateError) -> Self {
		DecodeError::new(err.to_string())
	}
}
