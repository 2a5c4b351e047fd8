// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core of the mapdoctor source map diagnostic tool.
//!
//! Given a captured error event, the [`Pipeline`] walks a fixed list of
//! checks to explain why the event's top in-app frame can (or cannot) be
//! mapped back to original source through the release's uploaded artifacts.
//!
//! # Overview
//!
//! - [`event`] and [`artifact`]: the platform data the pipeline consumes
//! - [`matcher`]: maps a frame URL or source map reference to a release artifact
//! - [`locator`]: finds where a generated file declares its source map
//! - [`resolver`] and [`context`]: turn a generated position into an original
//!   position and render the surrounding source lines
//! - [`pipeline`]: sequences all of the above with first-failure-wins semantics
//!
//! Network access and source map decoding are abstracted behind the
//! [`ReleaseApi`] and [`SourceMapDecoder`] traits, so the core performs no I/O.

pub mod artifact;
pub mod context;
pub mod error;
pub mod event;
pub mod locator;
pub mod matcher;
pub mod pipeline;
pub mod resolver;
pub mod step;

pub use artifact::{dist_matches, verify_dist, Artifact, ArtifactMetadata};
pub use context::render_context;
pub use error::{DecodeError, Diagnostic, DiagnosticKind, FetchError, Severity};
pub use event::{Event, ExceptionInterface, ExceptionValue, Frame, Stacktrace};
pub use locator::{discover_source_map, locate_source_map, Discovery, LocationOrigin, SourceMapLocation};
pub use matcher::{canonical_key, find_artifact, match_artifact, ArtifactMatch, VIRTUAL_ROOT};
pub use pipeline::{FrameSummary, Pipeline, PipelineOptions, ReleaseApi, Resolution};
pub use resolver::{
	resolve_position, DecodedSourceMap, OriginalPosition, ResolvedPosition, SourceMapDecoder,
};
pub use step::{NoopObserver, Step, StepObserver};
