// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! XDG config file location.

use std::path::PathBuf;

use crate::ConfigError;

const APP_DIR: &str = "mapdoctor";
const CONFIG_FILE: &str = "config.toml";

/// `$XDG_CONFIG_HOME/mapdoctor/config.toml`, falling back to `~/.config`.
pub fn user_config_file() -> Result<PathBuf, ConfigError> {
	let config_home = match std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
		Some(dir) => PathBuf::from(dir),
		None => dirs::home_dir()
			.ok_or(ConfigError::HomeDirNotFound)?
			.join(".config"),
	};

	let path = config_home.join(APP_DIR).join(CONFIG_FILE);
	tracing::debug!(path = %path.display(), "resolved user config file");
	Ok(path)
}
