// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! mapdoctor: explains why an error event's stack frame does or does not
//! resolve through the release's uploaded source maps.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use mapdoctor_config::{ApiConfigLayer, LoggingConfigLayer, MapdoctorConfigLayer};
use mapdoctor_core::{NoopObserver, Pipeline, PipelineOptions, StepObserver};
use mapdoctor_sentry::SentryClient;
use mapdoctor_symbolicate::SourceMapParser;

mod logging;
mod report;

use report::TerminalObserver;

/// Source map diagnostics for captured error events.
#[derive(Parser, Debug)]
#[command(name = "mapdoctor", about = "Diagnose source map resolution for an error event", version)]
struct Args {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Walk an event through every source map resolution check
	Diagnose(DiagnoseArgs),
	/// Show version and build information
	Version,
}

#[derive(clap::Args, Debug)]
struct DiagnoseArgs {
	/// Event identifier to diagnose
	#[arg(env = "MAPDOCTOR_EVENT_ID")]
	event_id: String,

	/// Organization slug
	#[arg(long)]
	org: Option<String>,

	/// Project slug
	#[arg(long)]
	project: Option<String>,

	/// API base URL
	#[arg(long)]
	url: Option<String>,

	/// Request timeout in seconds
	#[arg(long)]
	timeout: Option<u64>,

	/// Config file (default: $XDG_CONFIG_HOME/mapdoctor/config.toml)
	#[arg(long)]
	config: Option<PathBuf>,

	#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
	format: OutputFormat,

	/// Stop when the event was already source mapped by the server
	#[arg(long)]
	reject_mapped: bool,

	/// Diagnose the unprocessed stack trace of an already mapped event
	#[arg(long)]
	raw_stacktrace: bool,

	/// Increase log verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,

	/// Emit logs as JSON
	#[arg(long)]
	log_json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
	Text,
	Json,
}

impl DiagnoseArgs {
	fn config_overrides(&self) -> MapdoctorConfigLayer {
		MapdoctorConfigLayer {
			api: Some(ApiConfigLayer {
				base_url: self.url.clone(),
				organization: self.org.clone(),
				project: self.project.clone(),
				auth_token: None,
				timeout_secs: self.timeout,
			}),
			logging: Some(LoggingConfigLayer {
				level: None,
				json: self.log_json.then_some(true),
			}),
		}
	}

	fn pipeline_options(&self) -> PipelineOptions {
		PipelineOptions {
			reject_already_mapped: self.reject_mapped,
			use_raw_stacktrace: self.raw_stacktrace,
		}
	}
}

#[tokio::main]
async fn main() -> ExitCode {
	let args = Args::parse();

	match args.command {
		Command::Version => {
			println!("{}", mapdoctor_common_version::format_version_info());
			ExitCode::SUCCESS
		}
		Command::Diagnose(diagnose) => match run(diagnose).await {
			Ok(code) => code,
			Err(e) => {
				tracing::error!(error = %e, "diagnosis could not start");
				eprintln!("error: {e:#}");
				ExitCode::FAILURE
			}
		},
	}
}

/// Setup failures are returned as errors; a finished diagnosis maps to an exit code.
async fn run(args: DiagnoseArgs) -> anyhow::Result<ExitCode> {
	let overrides = args.config_overrides();
	let logging =
		mapdoctor_config::load_logging_config(overrides.clone(), args.config.as_deref());
	logging::init_tracing(&logging, args.verbose, args.log_json);

	let config = mapdoctor_config::load_config(overrides, args.config.as_deref())
		.context("failed to load configuration")?;
	let client = SentryClient::new(&config.api).context("failed to create API client")?;

	let observer: Arc<dyn StepObserver> = match args.format {
		OutputFormat::Text => Arc::new(TerminalObserver),
		OutputFormat::Json => Arc::new(NoopObserver),
	};

	let pipeline = Pipeline::new(client, SourceMapParser)
		.with_options(args.pipeline_options())
		.with_observer(observer);

	tracing::info!(event_id = %args.event_id, "starting diagnosis");
	let outcome = pipeline.run(&args.event_id).await;

	match (&outcome, args.format) {
		(Ok(resolution), OutputFormat::Text) => println!("{}", report::resolution_text(resolution)),
		(Ok(resolution), OutputFormat::Json) => println!("{}", report::resolved_json(resolution)?),
		(Err(diagnostic), OutputFormat::Text) => {
			let tips = report::tips_text(diagnostic);
			if !tips.is_empty() {
				eprintln!("{tips}");
			}
		}
		(Err(diagnostic), OutputFormat::Json) => println!("{}", report::aborted_json(diagnostic)?),
	}

	Ok(match outcome {
		Ok(_) => ExitCode::SUCCESS,
		Err(_) => ExitCode::FAILURE,
	})
}
