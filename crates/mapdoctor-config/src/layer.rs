// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

use crate::sections::{ApiConfigLayer, LoggingConfigLayer};

/// One source's view of the configuration; every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MapdoctorConfigLayer {
	#[serde(default)]
	pub api: Option<ApiConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl MapdoctorConfigLayer {
	/// Overlay `other` onto `self`; values set in `other` win.
	pub fn merge(&mut self, other: Self) {
		merge_section(&mut self.api, other.api, ApiConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T: Default>(base: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	if let Some(other) = other {
		merge(base.get_or_insert_with(T::default), other);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_fills_absent_section() {
		let mut base = MapdoctorConfigLayer::default();
		base.merge(MapdoctorConfigLayer {
			logging: Some(LoggingConfigLayer {
				level: Some("info".to_string()),
				json: None,
			}),
			..Default::default()
		});
		assert_eq!(base.logging.unwrap().level.as_deref(), Some("info"));
		assert!(base.api.is_none());
	}

	#[test]
	fn test_parse_full_file() {
		let layer: MapdoctorConfigLayer = toml::from_str(
			r#"
			[api]
			organization = "acme"
			project = "web"

			[logging]
			json = true
			"#,
		)
		.unwrap();
		assert_eq!(layer.api.unwrap().project.as_deref(), Some("web"));
		assert_eq!(layer.logging.unwrap().json, Some(true));
	}
}
