// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use sleeve_core::ElementId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a placement batch.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Model error: {0}")]
    Core(#[from] sleeve_core::Error),

    #[error("Geometry error: {0}")]
    Geometry(#[from] sleeve_geometry::Error),

    #[error("Conduit {element} aborted the batch")]
    ConduitAborted {
        element: ElementId,
        #[source]
        source: sleeve_geometry::Error,
    },

    #[error("Failed to set '{label}' on opening {instance}")]
    ParameterBinding {
        instance: ElementId,
        label: String,
        #[source]
        source: sleeve_core::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error was raised before the target document was touched.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::ConfigParse(_)
                | Error::Core(
                    sleeve_core::Error::DocumentNotFound(_)
                        | sleeve_core::Error::FamilyNotFound(_)
                        | sleeve_core::Error::NoSpatialContext(_)
                        | sleeve_core::Error::ViewNotFound(_)
                )
        )
    }
}
