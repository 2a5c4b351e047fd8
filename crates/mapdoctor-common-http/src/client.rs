// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.

use mapdoctor_common_version::BuildInfo;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Creates a new HTTP client builder with the standard mapdoctor User-Agent.
///
/// Use this when you need to customize the client further.
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates a new HTTP client with a request timeout and the standard User-Agent.
pub fn new_client_with_timeout(timeout: Duration) -> reqwest::Result<Client> {
	builder().timeout(timeout).build()
}

/// Returns the standard User-Agent string.
///
/// Format: `mapdoctor/{version} ({platform}; {git_sha})`
pub fn user_agent() -> String {
	let info = BuildInfo::current();
	format!(
		"mapdoctor/{} ({}; {})",
		info.version, info.platform, info.git_sha
	)
}
