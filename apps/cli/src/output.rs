// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON run output.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use sleeve_processing::{BatchReport, PlacementConfig};

/// Everything a run reports: where it read from, how it was configured and
/// what it placed.
#[derive(Debug, Serialize)]
pub struct RunOutput<'a> {
    pub scene: String,
    pub config: &'a PlacementConfig,
    pub report: &'a BatchReport,
}

impl RunOutput<'_> {
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// Write to `path`, or to stdout when no path is given.
    pub fn write(&self, path: Option<&Path>, pretty: bool) -> anyhow::Result<()> {
        let json = self.to_json(pretty).context("Failed to serialize report")?;
        match path {
            Some(path) => std::fs::write(path, json)
                .with_context(|| format!("Failed to write report to {}", path.display()))?,
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", json).context("Failed to write report to stdout")?;
            }
        }
        Ok(())
    }
}
