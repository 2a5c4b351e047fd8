// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Human and machine readable rendering of a diagnosis.

use mapdoctor_core::{Diagnostic, Resolution, Severity, Step, StepObserver};
use serde::Serialize;

const RULE: &str = "------------------------------------------------";
const CLOSING: &str = "Source maps should be working fine for this event.";

/// Prints one status line per finished step to stderr.
#[derive(Debug, Default)]
pub struct TerminalObserver;

impl StepObserver for TerminalObserver {
	fn started(&self, step: Step) {
		tracing::debug!(step = step.description(), "running step");
	}

	fn succeeded(&self, _step: Step, message: &str) {
		eprintln!("✔ {message}");
	}

	fn failed(&self, diagnostic: &Diagnostic) {
		eprintln!("{}", status_line(diagnostic));
	}
}

fn status_line(diagnostic: &Diagnostic) -> String {
	let marker = match diagnostic.severity {
		Severity::Warning => "⚠",
		Severity::Error => "✖",
	};
	format!("{marker} {}", diagnostic.reason)
}

/// The framed source snippet and closing line printed on success.
pub fn resolution_text(resolution: &Resolution) -> String {
	format!(
		"\n{}:{}:{}\n{RULE}\n{}\n{RULE}\n\n{CLOSING}",
		resolution.position.source,
		resolution.position.line,
		resolution.position.column,
		resolution.context,
	)
}

/// Remediation tips, one per line. Empty when there are none.
pub fn tips_text(diagnostic: &Diagnostic) -> String {
	diagnostic
		.tips
		.iter()
		.map(|tip| format!("  → {tip}"))
		.collect::<Vec<_>>()
		.join("\n")
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Report<'a> {
	Resolved(&'a Resolution),
	Aborted(&'a Diagnostic),
}

pub fn resolved_json(resolution: &Resolution) -> serde_json::Result<String> {
	serde_json::to_string_pretty(&Report::Resolved(resolution))
}

pub fn aborted_json(diagnostic: &Diagnostic) -> serde_json::Result<String> {
	serde_json::to_string_pretty(&Report::Aborted(diagnostic))
}
