// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conduit geometry source.
//!
//! Ducts and pipes are handled through one [`Conduit`] trait exposing the
//! element id, the location path and the diameter. Only straight paths are
//! supported; arcs and multi-run polylines are rejected instead of being
//! approximated.

use sleeve_core::{ConduitPath, ElementId, MepCurve};

use crate::error::{Error, Result};
use crate::segment::Segment;

/// Centerline and size of one conduit, ready for ray casting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConduitGeometry {
    pub element: ElementId,
    pub segment: Segment,
    pub diameter: f64,
}

/// Anything with a centerline path and a diameter.
pub trait Conduit {
    fn element_id(&self) -> ElementId;

    fn path(&self) -> &ConduitPath;

    fn diameter(&self) -> f64;

    /// Straight centerline segment of the conduit.
    fn segment(&self) -> Result<Segment> {
        linear_segment(self.element_id(), self.path())
    }

    /// Segment and validated diameter.
    fn geometry(&self) -> Result<ConduitGeometry> {
        let element = self.element_id();
        let diameter = self.diameter();
        if !(diameter.is_finite() && diameter > 0.0) {
            return Err(Error::InvalidDiameter { element, diameter });
        }
        Ok(ConduitGeometry {
            element,
            segment: self.segment()?,
            diameter,
        })
    }
}

impl Conduit for MepCurve {
    fn element_id(&self) -> ElementId {
        self.id
    }

    fn path(&self) -> &ConduitPath {
        &self.path
    }

    fn diameter(&self) -> f64 {
        self.diameter
    }
}

impl<C: Conduit + ?Sized> Conduit for &C {
    fn element_id(&self) -> ElementId {
        (**self).element_id()
    }

    fn path(&self) -> &ConduitPath {
        (**self).path()
    }

    fn diameter(&self) -> f64 {
        (**self).diameter()
    }
}

/// Extract the straight segment of a conduit path.
///
/// A line, or a polyline made of exactly two points, is a single straight
/// segment. Everything else fails with [`Error::NotLinearGeometry`].
pub fn linear_segment(element: ElementId, path: &ConduitPath) -> Result<Segment> {
    let (start, end) = match path {
        ConduitPath::Line { start, end } => (*start, *end),
        ConduitPath::Polyline(points) if points.len() == 2 => (points[0], points[1]),
        other => {
            return Err(Error::NotLinearGeometry {
                element,
                curve: other.kind_name(),
            })
        }
    };
    Segment::from_endpoints(start, end).ok_or(Error::DegenerateSegment(element))
}
