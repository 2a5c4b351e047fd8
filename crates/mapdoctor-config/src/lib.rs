// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for mapdoctor.
//!
//! Sources, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. TOML file (`--config` or `$XDG_CONFIG_HOME/mapdoctor/config.toml`)
//! 3. Environment variables (`MAPDOCTOR_*`)
//! 4. Command-line flags
//!
//! # Usage
//!
//! ```ignore
//! use mapdoctor_config::{load_config, MapdoctorConfigLayer};
//!
//! let config = load_config(MapdoctorConfigLayer::default(), None)?;
//! println!("querying {}", config.api.base_url);
//! ```

pub mod error;
pub mod layer;
pub mod paths;
pub mod sections;
pub mod sources;

use std::path::{Path, PathBuf};

pub use error::ConfigError;
pub use layer::MapdoctorConfigLayer;
pub use sections::*;
pub use sources::{CliSource, ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct MapdoctorConfig {
	pub api: ApiConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// `cli` carries flag overrides. An explicit `config_path` must exist; the
/// default XDG file is skipped when absent.
pub fn load_config(
	cli: MapdoctorConfigLayer,
	config_path: Option<&Path>,
) -> Result<MapdoctorConfig, ConfigError> {
	let mut sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(EnvSource::process()),
		Box::new(CliSource::new(cli)),
	];
	if let Some(file) = file_source(config_path, paths::user_config_file()) {
		sources.push(Box::new(file));
	}

	load_config_from_sources(sources)
}

/// The TOML layer: an explicit path is required, the default path is optional
/// and dropped entirely when it cannot be resolved.
fn file_source(
	config_path: Option<&Path>,
	default_path: Result<PathBuf, ConfigError>,
) -> Option<TomlSource> {
	match (config_path, default_path) {
		(Some(path), _) => Some(TomlSource::required(path)),
		(None, Ok(path)) => Some(TomlSource::optional(path)),
		(None, Err(e)) => {
			debug!(error = %e, "no default config file location");
			None
		}
	}
}

/// Merge `sources` by precedence and finalize.
pub fn load_config_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<MapdoctorConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = MapdoctorConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Resolve only the logging section, ignoring API validation.
///
/// Used to set up tracing before the full configuration is known to be
/// valid, so that configuration errors themselves can be logged.
pub fn load_logging_config(
	cli: MapdoctorConfigLayer,
	config_path: Option<&Path>,
) -> LoggingConfig {
	let mut merged = MapdoctorConfigLayer::default();
	let file = file_source(config_path, paths::user_config_file());

	if let Some(Ok(layer)) = file.map(|f| f.load()) {
		merged.merge(layer);
	}
	if let Ok(layer) = EnvSource::process().load() {
		merged.merge(layer);
	}
	merged.merge(cli);

	merged.logging.unwrap_or_default().finalize()
}

fn finalize(layer: MapdoctorConfigLayer) -> Result<MapdoctorConfig, ConfigError> {
	let api = layer.api.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();

	info!(
		base_url = %api.base_url,
		organization = %api.organization,
		project = %api.project,
		timeout_secs = api.timeout.as_secs(),
		"configuration loaded"
	);

	Ok(MapdoctorConfig { api, logging })
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	use mapdoctor_common_secret::SecretString;

	fn cli(org: Option<&str>) -> MapdoctorConfigLayer {
		MapdoctorConfigLayer {
			api: Some(ApiConfigLayer {
				organization: org.map(str::to_string),
				..ApiConfigLayer::default()
			}),
			logging: None,
		}
	}

	#[test]
	fn test_layers_apply_in_precedence_order() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[api]
organization = "from-file"
project = "from-file"
timeout_secs = 10

[logging]
level = "debug"
"#
		)
		.unwrap();

		// Listed out of order on purpose; sorting restores precedence.
		let config = load_config_from_sources(vec![
			Box::new(CliSource::new(cli(Some("from-cli")))),
			Box::new(EnvSource::from_vars([
				(sources::ENV_ORG, "from-env"),
				(sources::ENV_PROJECT, "from-env"),
				(sources::ENV_AUTH_TOKEN, "token"),
			])),
			Box::new(TomlSource::required(file.path())),
			Box::new(DefaultsSource),
		])
		.unwrap();

		assert_eq!(config.api.organization, "from-cli");
		assert_eq!(config.api.project, "from-env");
		assert_eq!(config.api.timeout.as_secs(), 10);
		assert_eq!(config.api.auth_token.expose(), "token");
		assert_eq!(config.api.base_url.as_str(), DEFAULT_BASE_URL);
		assert_eq!(config.logging.level, "debug");
	}

	#[test]
	fn test_missing_project_is_reported() {
		let err = load_config_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(EnvSource::from_vars([(sources::ENV_ORG, "acme")])),
			Box::new(CliSource::new(MapdoctorConfigLayer {
				api: Some(ApiConfigLayer {
					auth_token: Some(SecretString::new("t".to_string())),
					..ApiConfigLayer::default()
				}),
				logging: None,
			})),
		])
		.unwrap_err();

		assert!(err.to_string().contains("api.project"));
	}

	#[test]
	fn test_cli_none_does_not_clear_env() {
		let config = load_config_from_sources(vec![
			Box::new(EnvSource::from_vars([
				(sources::ENV_ORG, "acme"),
				(sources::ENV_PROJECT, "web"),
				(sources::ENV_AUTH_TOKEN, "t"),
			])),
			Box::new(CliSource::new(cli(None))),
		])
		.unwrap();
		assert_eq!(config.api.organization, "acme");
	}

	#[test]
	fn test_unresolvable_home_skips_default_file() {
		assert!(file_source(None, Err(ConfigError::HomeDirNotFound)).is_none());

		let dir = tempfile::tempdir().unwrap();
		let explicit = dir.path().join("missing.toml");
		let source = file_source(Some(explicit.as_path()), Err(ConfigError::HomeDirNotFound)).unwrap();
		assert_eq!(source.precedence(), Precedence::ConfigFile);
		assert!(matches!(source.load(), Err(ConfigError::FileNotFound(_))));
	}

	#[test]
	fn test_missing_default_file_is_skipped() {
		let dir = tempfile::tempdir().unwrap();
		let source = file_source(None, Ok(dir.path().join("config.toml"))).unwrap();
		assert!(source.load().unwrap().api.is_none());
	}

	#[test]
	fn test_debug_output_redacts_token() {
		let config = load_config_from_sources(vec![Box::new(EnvSource::from_vars([
			(sources::ENV_ORG, "acme"),
			(sources::ENV_PROJECT, "web"),
			(sources::ENV_AUTH_TOKEN, "sntrys_live_secret"),
		]))])
		.unwrap();
		let rendered = format!("{config:?}");
		assert!(!rendered.contains("sntrys_live_secret"));
		assert!(rendered.contains(mapdoctor_common_secret::REDACTED));
	}
}
