// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML file, environment and command line.

use std::collections::HashMap;
use std::path::PathBuf;

use mapdoctor_common_secret::SecretString;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::MapdoctorConfigLayer;
use crate::sections::{ApiConfigLayer, LoggingConfigLayer};

pub const ENV_API_URL: &str = "MAPDOCTOR_API_URL";
pub const ENV_ORG: &str = "MAPDOCTOR_ORG";
pub const ENV_PROJECT: &str = "MAPDOCTOR_PROJECT";
pub const ENV_TIMEOUT_SECS: &str = "MAPDOCTOR_TIMEOUT_SECS";
pub const ENV_AUTH_TOKEN: &str = "MAPDOCTOR_AUTH_TOKEN";
pub const ENV_AUTH_TOKEN_FILE: &str = "MAPDOCTOR_AUTH_TOKEN_FILE";
/// Accepted for compatibility with older setups.
pub const ENV_LEGACY_AUTH_TOKEN: &str = "AUTH_TOKEN";
pub const ENV_LOG_LEVEL: &str = "MAPDOCTOR_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "MAPDOCTOR_LOG_JSON";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
	CommandLine = 90,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<MapdoctorConfigLayer, ConfigError>;
}

/// Built-in defaults source.
///
/// Defaults are applied in `finalize`, so this contributes an empty layer.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<MapdoctorConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(MapdoctorConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
	required: bool,
}

impl TomlSource {
	/// A file that is skipped when absent.
	pub fn optional(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: false,
		}
	}

	/// A file the user asked for explicitly; absence is an error.
	pub fn required(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: true,
		}
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<MapdoctorConfigLayer, ConfigError> {
		if !self.path.exists() {
			if self.required {
				return Err(ConfigError::FileNotFound(self.path.clone()));
			}
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(MapdoctorConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: MapdoctorConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `MAPDOCTOR_<FIELD>`. Empty values count as unset.
pub struct EnvSource {
	vars: Option<HashMap<String, String>>,
}

impl EnvSource {
	/// Reads the process environment.
	pub fn process() -> Self {
		Self { vars: None }
	}

	/// Reads from a fixed set of variables instead of the process environment.
	pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			vars: Some(
				vars.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		let value = match &self.vars {
			Some(vars) => vars.get(name).cloned(),
			None => std::env::var(name).ok(),
		};
		value.filter(|s| !s.is_empty())
	}

	fn bool(&self, name: &str) -> Result<Option<bool>, ConfigError> {
		match self.var(name) {
			Some(v) => match v.to_ascii_lowercase().as_str() {
				"1" | "true" | "yes" => Ok(Some(true)),
				"0" | "false" | "no" => Ok(Some(false)),
				_ => Err(ConfigError::invalid_value(
					name,
					format!("invalid boolean value '{v}'"),
				)),
			},
			None => Ok(None),
		}
	}

	fn u64(&self, name: &str) -> Result<Option<u64>, ConfigError> {
		match self.var(name) {
			Some(v) => v.parse().map(Some).map_err(|_| {
				ConfigError::invalid_value(name, format!("invalid u64 value '{v}'"))
			}),
			None => Ok(None),
		}
	}

	fn auth_token(&self) -> Result<Option<SecretString>, ConfigError> {
		if let Some(token) = self.var(ENV_AUTH_TOKEN) {
			return Ok(Some(SecretString::new(token)));
		}

		if let Some(path) = self.var(ENV_AUTH_TOKEN_FILE) {
			let path = PathBuf::from(path);
			debug!(path = %path.display(), "reading auth token from file");
			let content = std::fs::read_to_string(&path)
				.map_err(|e| ConfigError::FileRead { path, source: e })?;
			return Ok(Some(SecretString::new(content.trim().to_string())));
		}

		if let Some(token) = self.var(ENV_LEGACY_AUTH_TOKEN) {
			debug!("using legacy {ENV_LEGACY_AUTH_TOKEN} variable");
			return Ok(Some(SecretString::new(token)));
		}

		Ok(None)
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<MapdoctorConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(MapdoctorConfigLayer {
			api: Some(ApiConfigLayer {
				base_url: self.var(ENV_API_URL),
				organization: self.var(ENV_ORG),
				project: self.var(ENV_PROJECT),
				auth_token: self.auth_token()?,
				timeout_secs: self.u64(ENV_TIMEOUT_SECS)?,
			}),
			logging: Some(LoggingConfigLayer {
				level: self.var(ENV_LOG_LEVEL),
				json: self.bool(ENV_LOG_JSON)?,
			}),
		})
	}
}

/// Overrides taken from command-line flags.
pub struct CliSource {
	layer: MapdoctorConfigLayer,
}

impl CliSource {
	pub fn new(layer: MapdoctorConfigLayer) -> Self {
		Self { layer }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"command-line"
	}

	fn precedence(&self) -> Precedence {
		Precedence::CommandLine
	}

	fn load(&self) -> Result<MapdoctorConfigLayer, ConfigError> {
		Ok(self.layer.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_precedence_order() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
		assert!(Precedence::Environment < Precedence::CommandLine);
	}

	#[test]
	fn test_env_reads_fields() {
		let layer = EnvSource::from_vars([
			(ENV_ORG, "acme"),
			(ENV_PROJECT, "web"),
			(ENV_TIMEOUT_SECS, "12"),
			(ENV_LOG_JSON, "true"),
			(ENV_API_URL, ""),
		])
		.load()
		.unwrap();

		let api = layer.api.unwrap();
		assert_eq!(api.organization.as_deref(), Some("acme"));
		assert_eq!(api.timeout_secs, Some(12));
		assert!(api.base_url.is_none());
		assert_eq!(layer.logging.unwrap().json, Some(true));
	}

	#[test]
	fn test_env_rejects_bad_numbers() {
		let err = EnvSource::from_vars([(ENV_TIMEOUT_SECS, "soon")])
			.load()
			.unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == ENV_TIMEOUT_SECS));
	}

	#[test]
	fn test_env_rejects_bad_bool() {
		assert!(EnvSource::from_vars([(ENV_LOG_JSON, "maybe")]).load().is_err());
	}

	#[test]
	fn test_token_precedence() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "  from-file  ").unwrap();
		let path = file.path().to_string_lossy().to_string();
		let path = path.as_str();

		let token = |vars: Vec<(&str, &str)>| {
			EnvSource::from_vars(vars)
				.auth_token()
				.unwrap()
				.map(|t| t.expose().clone())
		};

		assert_eq!(
			token(vec![
				(ENV_AUTH_TOKEN, "primary"),
				(ENV_AUTH_TOKEN_FILE, path),
				(ENV_LEGACY_AUTH_TOKEN, "legacy"),
			]),
			Some("primary".to_string())
		);
		assert_eq!(
			token(vec![
				(ENV_AUTH_TOKEN_FILE, path),
				(ENV_LEGACY_AUTH_TOKEN, "legacy"),
			]),
			Some("from-file".to_string())
		);
		assert_eq!(
			token(vec![(ENV_LEGACY_AUTH_TOKEN, "legacy")]),
			Some("legacy".to_string())
		);
		assert_eq!(token(vec![]), None);
	}

	#[test]
	fn test_missing_token_file_is_error() {
		let err = EnvSource::from_vars([(ENV_AUTH_TOKEN_FILE, "/nonexistent/mapdoctor/token")])
			.auth_token()
			.unwrap_err();
		assert!(matches!(err, ConfigError::FileRead { .. }));
	}

	#[test]
	fn test_optional_toml_missing_is_empty() {
		let dir = tempfile::tempdir().unwrap();
		let layer = TomlSource::optional(dir.path().join("absent.toml"))
			.load()
			.unwrap();
		assert_eq!(layer, MapdoctorConfigLayer::default());
	}

	#[test]
	fn test_required_toml_missing_is_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = TomlSource::required(dir.path().join("absent.toml"))
			.load()
			.unwrap_err();
		assert!(matches!(err, ConfigError::FileNotFound(_)));
	}

	#[test]
	fn test_toml_parse_error_names_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[api\norganization = ").unwrap();
		let err = TomlSource::required(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
		assert!(err.to_string().contains(&file.path().display().to_string()));
	}
}
