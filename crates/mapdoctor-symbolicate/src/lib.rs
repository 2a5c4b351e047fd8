// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map v3 decoding for mapdoctor.
//!
//! [`SourceMapParser`] plugs into the diagnostic pipeline as its
//! [`SourceMapDecoder`](mapdoctor_core::SourceMapDecoder). Only basic
//! (non-indexed) maps are supported.
//!
//! ```
//! use mapdoctor_symbolicate::ParsedSourceMap;
//!
//! let map = ParsedSourceMap::parse(r#"{
//!     "version": 3,
//!     "sources": ["src/app.ts"],
//!     "sourcesContent": ["throw new Error();\n"],
//!     "mappings": "AAAA"
//! }"#).unwrap();
//!
//! let hit = map.lookup(1, 0).unwrap();
//! assert_eq!(hit.position.source, "src/app.ts");
//! ```

pub mod error;
pub mod sourcemap;
pub mod vlq;

pub use error::{Result, SymbolicateError};
pub use sourcemap::{Lookup, ParsedSourceMap, SourceMapParser};
