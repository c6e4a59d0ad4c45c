// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration: environment, then config file, then flags.

use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;
use sleeve_processing::{NonLinearPolicy, PlacementConfig};

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "sleeve", version)]
#[command(about = "Place wall openings where ducts and pipes cross walls")]
pub struct Args {
    /// Scene file describing the open documents (JSON)
    pub scene: PathBuf,

    /// Placement config file (JSON); overrides environment settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the batch report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Title substring of the MEP document
    #[arg(long)]
    pub source_tag: Option<String>,

    /// Opening family name
    #[arg(long)]
    pub family: Option<String>,

    /// 3D view used for ray casting
    #[arg(long)]
    pub view: Option<String>,

    /// Plan conduits on one thread
    #[arg(long)]
    pub sequential: bool,

    /// Fail the batch on arcs and multi-run polylines instead of skipping them
    #[arg(long)]
    pub abort_on_non_linear: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Settings read from `SLEEVE_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub placement: PlacementConfig,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = PlacementConfig::default();
        let placement = PlacementConfig {
            source_tag: var("SLEEVE_SOURCE_TAG").unwrap_or(defaults.source_tag),
            family_name: var("SLEEVE_FAMILY").unwrap_or(defaults.family_name),
            width_parameter: var("SLEEVE_WIDTH_PARAM").unwrap_or(defaults.width_parameter),
            height_parameter: var("SLEEVE_HEIGHT_PARAM").unwrap_or(defaults.height_parameter),
            view_name: var("SLEEVE_VIEW").filter(|v| !v.is_empty()).or(defaults.view_name),
            non_linear: var("SLEEVE_NON_LINEAR")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.non_linear),
            parallel: var("SLEEVE_PARALLEL")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.parallel),
            ..defaults
        };

        Self {
            placement,
            log_format: var("SLEEVE_LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        }
    }

    /// Layer a JSON config file over the environment settings. Keys present
    /// in the file win; absent keys keep their current value.
    pub fn merge_file(&mut self, json: &str) -> sleeve_processing::Result<()> {
        let overrides: Value = serde_json::from_str(json)?;
        let mut base = serde_json::to_value(&self.placement)?;
        if let (Value::Object(base), Value::Object(overrides)) = (&mut base, overrides) {
            base.extend(overrides);
        }
        self.placement = serde_json::from_value(base)?;
        self.placement.validate()
    }

    /// Apply command-line flags, which take precedence over everything else.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(tag) = &args.source_tag {
            self.placement.source_tag = tag.clone();
        }
        if let Some(family) = &args.family {
            self.placement.family_name = family.clone();
        }
        if let Some(view) = &args.view {
            self.placement.view_name = Some(view.clone());
        }
        if args.sequential {
            self.placement.parallel = false;
        }
        if args.abort_on_non_linear {
            self.placement.non_linear = NonLinearPolicy::Abort;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
