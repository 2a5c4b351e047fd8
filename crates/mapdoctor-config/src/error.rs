// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration error types.

use std::path::PathBuf;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// Config file exists but could not be read
	#[error("failed to read {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// TOML parsing error
	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// Required setting absent from every source
	#[error("missing required setting {field} ({hint})")]
	MissingField { field: String, hint: String },

	#[error("invalid value for {field}: {message}")]
	InvalidValue { field: String, message: String },

	/// Explicitly requested config file does not exist
	#[error("config file not found: {0}")]
	FileNotFound(PathBuf),

	#[error("could not determine home directory")]
	HomeDirNotFound,
}

impl ConfigError {
	pub fn missing_field(field: impl Into<String>, hint: impl Into<String>) -> Self {
		Self::MissingField {
			field: field.into(),
			hint: hint.into(),
		}
	}

	pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			field: field.into(),
			message: message.into(),
		}
	}
}
