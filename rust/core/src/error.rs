// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for host model operations.

use crate::ids::ElementId;

/// Result type alias for host model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the in-memory model repository and its unit of work.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No open document has a title containing the requested tag.
    #[error("no open document title contains \"{0}\"")]
    DocumentNotFound(String),

    /// No family symbol with the requested family name exists.
    #[error("opening family \"{0}\" is not loaded in the document")]
    FamilyNotFound(String),

    /// No usable (non-template) 3D view exists.
    #[error("document \"{0}\" has no non-template 3D view")]
    NoSpatialContext(String),

    /// A 3D view was requested by name but is missing or a template.
    #[error("3D view \"{0}\" does not exist or is a view template")]
    ViewNotFound(String),

    /// An element id does not resolve to any element.
    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    /// An element id is already taken in the document.
    #[error("element {0} already exists")]
    DuplicateElement(ElementId),

    /// Every element id of the document is taken.
    #[error("document \"{0}\" has no element ids left")]
    IdSpaceExhausted(String),

    /// An element resolved, but to the wrong kind of element.
    #[error("element {id} is a {found}, not a {expected}")]
    WrongElementKind {
        id: ElementId,
        expected: &'static str,
        found: &'static str,
    },

    /// The placed family has no parameter with this label.
    #[error("family \"{family}\" has no parameter labelled \"{label}\"")]
    ParameterNotFound { label: String, family: String },

    /// A family symbol was instantiated before being activated.
    #[error("family symbol {0} must be activated before placement")]
    SymbolNotActive(ElementId),

    /// Shape construction received degenerate input.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}
