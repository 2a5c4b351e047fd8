// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Remote API configuration section.

use std::time::Duration;

use mapdoctor_common_secret::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://sentry.io/api/0/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiConfigLayer {
	pub base_url: Option<String>,
	pub organization: Option<String>,
	pub project: Option<String>,
	pub auth_token: Option<SecretString>,
	pub timeout_secs: Option<u64>,
}

impl ApiConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.organization.is_some() {
			self.organization = other.organization;
		}
		if other.project.is_some() {
			self.project = other.project;
		}
		if other.auth_token.is_some() {
			self.auth_token = other.auth_token;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
	}

	pub fn finalize(self) -> Result<ApiConfig, ConfigError> {
		let raw_url = self
			.base_url
			.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
		let base_url = Url::parse(&raw_url)
			.map_err(|e| ConfigError::invalid_value("api.base_url", format!("{raw_url}: {e}")))?;
		if base_url.cannot_be_a_base() {
			return Err(ConfigError::invalid_value(
				"api.base_url",
				format!("{raw_url} is not a hierarchical URL"),
			));
		}

		let organization = required(
			self.organization,
			"api.organization",
			"set --org, MAPDOCTOR_ORG or [api] organization",
		)?;
		let project = required(
			self.project,
			"api.project",
			"set --project, MAPDOCTOR_PROJECT or [api] project",
		)?;

		let auth_token = self
			.auth_token
			.filter(|t| !t.is_blank())
			.ok_or_else(|| {
				ConfigError::missing_field(
					"api.auth_token",
					"set MAPDOCTOR_AUTH_TOKEN, MAPDOCTOR_AUTH_TOKEN_FILE or [api] auth_token",
				)
			})?;

		let timeout_secs = match self.timeout_secs {
			Some(0) => {
				return Err(ConfigError::invalid_value(
					"api.timeout_secs",
					"must be greater than zero",
				))
			}
			Some(secs) => secs,
			None => DEFAULT_TIMEOUT_SECS,
		};

		Ok(ApiConfig {
			base_url,
			organization,
			project,
			auth_token,
			timeout: Duration::from_secs(timeout_secs),
		})
	}
}

fn required(value: Option<String>, field: &str, hint: &str) -> Result<String, ConfigError> {
	value
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
		.ok_or_else(|| ConfigError::missing_field(field, hint))
}

/// Resolved API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
	pub base_url: Url,
	/// Organization slug.
	pub organization: String,
	/// Project slug.
	pub project: String,
	pub auth_token: SecretString,
	pub timeout: Duration,
}
