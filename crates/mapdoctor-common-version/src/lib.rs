// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared build and version information for mapdoctor.
//!
//! Single source of truth for the version, git SHA, build timestamp and
//! platform reported by the CLI and sent in the HTTP User-Agent.

shadow_rs::shadow!(build);

/// Platform string in `{os}-{arch}` format, e.g. "linux-x86_64".
pub const PLATFORM: &str = env!("MAPDOCTOR_PLATFORM");

/// Core build information.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
	pub version: &'static str,
	pub git_sha: &'static str,
	pub build_timestamp: &'static str,
	pub platform: &'static str,
}

impl BuildInfo {
	/// Get the current build information (compile-time constants).
	#[allow(clippy::const_is_empty)]
	pub const fn current() -> Self {
		Self {
			version: build::PKG_VERSION,
			git_sha: if build::SHORT_COMMIT.is_empty() {
				"unknown"
			} else {
				build::SHORT_COMMIT
			},
			build_timestamp: build::BUILD_TIME,
			platform: PLATFORM,
		}
	}
}

/// Format build information for `mapdoctor version`.
pub fn format_version_info() -> String {
	let info = BuildInfo::current();

	format!(
		"mapdoctor {}\n\
		 Git SHA:  {}\n\
		 Built:    {}\n\
		 Platform: {}",
		info.version, info.git_sha, info.build_timestamp, info.platform,
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn build_info_has_version() {
		let info = BuildInfo::current();
		assert!(!info.version.is_empty());
		assert!(!info.git_sha.is_empty());
	}

	#[test]
	fn platform_format_is_valid() {
		assert!(PLATFORM.contains('-'));
	}

	#[test]
	fn version_info_mentions_platform() {
		let text = format_version_info();
		assert!(text.starts_with("mapdoctor "));
		assert!(text.contains(PLATFORM));
	}
}
