// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch configuration.

use serde::{Deserialize, Serialize};
use sleeve_core::{Category, CategoryFilter};

use crate::error::{Error, Result};

/// What to do with a conduit whose centerline is not a straight line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonLinearPolicy {
    /// Warn, record the conduit in the report and go on.
    #[default]
    Skip,
    /// Fail the batch and roll back every placement.
    Abort,
}

impl std::str::FromStr for NonLinearPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(NonLinearPolicy::Skip),
            "abort" => Ok(NonLinearPolicy::Abort),
            other => Err(Error::Config(format!(
                "unknown non-linear policy '{}' (expected skip or abort)",
                other
            ))),
        }
    }
}

/// Settings for one placement batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Substring identifying the MEP document among the open documents
    pub source_tag: String,
    /// Family of the opening symbol placed in the active document
    pub family_name: String,
    pub width_parameter: String,
    pub height_parameter: String,
    /// Categories a conduit is cast against
    pub target_categories: Vec<Category>,
    /// 3D view used as ray-casting context; first non-template view if unset
    pub view_name: Option<String>,
    pub non_linear: NonLinearPolicy,
    /// Plan conduits on the rayon pool
    pub parallel: bool,
    /// Name of the unit of work wrapping the placements
    pub transaction_name: String,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            source_tag: "MEP".to_string(),
            family_name: "Openings".to_string(),
            width_parameter: "Width".to_string(),
            height_parameter: "Height".to_string(),
            target_categories: vec![Category::Wall],
            view_name: None,
            non_linear: NonLinearPolicy::Skip,
            parallel: true,
            transaction_name: "Place wall openings".to_string(),
        }
    }
}

impl PlacementConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PlacementConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no batch could run with.
    pub fn validate(&self) -> Result<()> {
        if self.source_tag.is_empty() {
            return Err(Error::Config("source tag must not be empty".into()));
        }
        if self.family_name.is_empty() {
            return Err(Error::Config("family name must not be empty".into()));
        }
        if self.width_parameter.is_empty() || self.height_parameter.is_empty() {
            return Err(Error::Config("parameter labels must not be empty".into()));
        }
        if self.target_categories.is_empty() {
            return Err(Error::Config("at least one target category is required".into()));
        }
        Ok(())
    }

    /// Target categories as a query filter.
    pub fn category_filter(&self) -> CategoryFilter {
        self.target_categories.iter().copied().collect()
    }
}
