// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error event types, as returned by the platform's event JSON endpoint.
//!
//! Only the fields the diagnosis reads are modelled; everything else in the
//! payload is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// A captured error event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
	#[serde(default, alias = "eventID")]
	pub event_id: Option<String>,
	#[serde(default)]
	pub release: Option<String>,
	#[serde(default)]
	pub dist: Option<String>,
	#[serde(default)]
	pub exception: Option<ExceptionInterface>,
}

impl Event {
	/// Release name, treating an empty string like a missing one.
	pub fn release(&self) -> Option<&str> {
		self.release.as_deref().filter(|r| !r.is_empty())
	}

	/// Distribution tag exactly as captured.
	pub fn dist(&self) -> Option<&str> {
		self.dist.as_deref()
	}

	/// The first exception value. Later values are never examined.
	pub fn first_exception(&self) -> Option<&ExceptionValue> {
		self.exception.as_ref().and_then(|e| e.values.first())
	}
}

/// The `exception` interface: an ordered list of exception values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExceptionInterface {
	#[serde(default)]
	pub values: Vec<ExceptionValue>,
}

/// One exception in the chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExceptionValue {
	#[serde(default, rename = "type")]
	pub ty: Option<String>,
	#[serde(default)]
	pub value: Option<String>,
	#[serde(default)]
	pub stacktrace: Option<Stacktrace>,
	/// Unprocessed trace, present when the platform already applied source maps.
	#[serde(default)]
	pub raw_stacktrace: Option<Stacktrace>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stacktrace {
	#[serde(default)]
	pub frames: Vec<Frame>,
}

impl Stacktrace {
	/// The deepest in-app frame (frames are ordered outermost first).
	pub fn last_in_app_frame(&self) -> Option<&Frame> {
		self.frames.iter().rev().find(|f| f.is_in_app())
	}
}

/// A single stack frame in generated code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
	#[serde(default)]
	pub abs_path: Option<String>,
	#[serde(default)]
	pub filename: Option<String>,
	#[serde(default)]
	pub function: Option<String>,
	/// 1-based line in the generated file.
	#[serde(default)]
	pub lineno: Option<u32>,
	/// 1-based column in the generated file.
	#[serde(default)]
	pub colno: Option<u32>,
	#[serde(default)]
	pub in_app: Option<bool>,
}

impl Frame {
	pub fn is_in_app(&self) -> bool {
		self.in_app.unwrap_or(false)
	}
}
