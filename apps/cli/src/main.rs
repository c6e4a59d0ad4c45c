// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sleeve CLI - place wall openings for every duct and pipe crossing a wall.
//!
//! Reads a JSON scene (the open documents), runs one placement batch against
//! its active document and writes the placed openings and the batch report
//! as JSON.
//!
//! # Configuration
//!
//! Settings are layered, later sources winning:
//!
//! 1. Built-in defaults
//! 2. `SLEEVE_*` environment variables
//! 3. `--config <file>` (JSON, any subset of the placement settings)
//! 4. Command-line flags
//!
//! Logs go to stderr; `RUST_LOG` filters them and `SLEEVE_LOG_FORMAT`
//! (`pretty`, `compact` or `json`) picks the formatter.

use std::fs;

use anyhow::Context;
use clap::Parser;

mod config;
mod output;
mod scene;

use config::{Args, Config, LogFormat};
use output::RunOutput;
use scene::SceneFile;

fn init_tracing(format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sleeve_processing=debug".into()),
        )
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env();
    init_tracing(config.log_format);

    if let Some(path) = &args.config {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        config
            .merge_file(&json)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
    }
    config.apply_args(&args);

    tracing::info!(
        scene = %args.scene.display(),
        source_tag = %config.placement.source_tag,
        family = %config.placement.family_name,
        view = ?config.placement.view_name,
        parallel = config.placement.parallel,
        non_linear = ?config.placement.non_linear,
        "Starting Sleeve"
    );

    let json = fs::read_to_string(&args.scene)
        .with_context(|| format!("Failed to read scene {}", args.scene.display()))?;
    let mut project = SceneFile::from_json(&json)
        .and_then(SceneFile::into_project)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;

    let report = sleeve_processing::run_batch(&mut project, config.placement.clone())
        .context("Opening placement failed, no openings were created")?;

    RunOutput {
        scene: args.scene.display().to_string(),
        config: &config.placement,
        report: &report,
    }
    .write(args.output.as_deref(), args.pretty)
}
