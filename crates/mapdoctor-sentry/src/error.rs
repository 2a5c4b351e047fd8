// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Errors raised while constructing a [`SentryClient`](crate::SentryClient).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SentryClientError>;

#[derive(Debug, Error)]
pub enum SentryClientError {
	#[error("API base URL cannot have path segments: {0}")]
	InvalidBaseUrl(String),

	#[error("failed to build HTTP client: {0}")]
	HttpClient(#[from] reqwest::Error),
}
