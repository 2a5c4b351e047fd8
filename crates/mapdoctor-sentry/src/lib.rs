// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sentry Web API client implementing [`ReleaseApi`](mapdoctor_core::ReleaseApi).

mod client;
pub mod error;

pub use client::SentryClient;
pub use error::{Result, SentryClientError};
