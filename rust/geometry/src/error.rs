use sleeve_core::ElementId;
use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting conduit geometry
#[derive(Error, Debug)]
pub enum Error {
    #[error("conduit {element} has a {curve} path; only straight segments are supported")]
    NotLinearGeometry {
        element: ElementId,
        curve: &'static str,
    },

    #[error("conduit {0} has coincident endpoints")]
    DegenerateSegment(ElementId),

    #[error("conduit {element} has invalid diameter {diameter}")]
    InvalidDiameter { element: ElementId, diameter: f64 },

    #[error("Core model error: {0}")]
    CoreError(#[from] sleeve_core::Error),
}
