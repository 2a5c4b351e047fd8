// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod api;
mod logging;

pub use api::{ApiConfig, ApiConfigLayer, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use logging::{LoggingConfig, LoggingConfigLayer, DEFAULT_LOG_LEVEL};
