// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing subscriber setup. Logs always go to stderr so stdout stays
//! reserved for the report.

use mapdoctor_config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for the given `-v` count, falling back to the configured level.
pub fn filter_directive(verbosity: u8, configured: &str) -> String {
	match verbosity {
		0 => configured.to_string(),
		1 => "info".to_string(),
		2 => "debug".to_string(),
		_ => "trace".to_string(),
	}
}

/// Install the global subscriber. `RUST_LOG` overrides everything else.
pub fn init_tracing(config: &LoggingConfig, verbosity: u8, json: bool) {
	let fallback = filter_directive(verbosity, &config.level);
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into());

	if json || config.json {
		tracing_subscriber::registry()
			.with(filter)
			.with(
				tracing_subscriber::fmt::layer()
					.json()
					.with_writer(std::io::stderr)
					.with_target(true),
			)
			.init();
	} else {
		tracing_subscriber::registry()
			.with(filter)
			.with(
				tracing_subscriber::fmt::layer()
					.with_writer(std::io::stderr)
					.with_target(false),
			)
			.init();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn verbosity_overrides_config() {
		assert_eq!(filter_directive(0, "warn"), "warn");
		assert_eq!(filter_directive(1, "warn"), "info");
		assert_eq!(filter_directive(2, "warn"), "debug");
		assert_eq!(filter_directive(9, "warn"), "trace");
	}

	#[test]
	fn configured_directive_passes_through() {
		assert_eq!(
			filter_directive(0, "mapdoctor_sentry=debug"),
			"mapdoctor_sentry=debug"
		);
	}
}
