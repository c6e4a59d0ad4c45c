// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Straight centerline segments.

use nalgebra::{Point3, Vector3};

/// Below this length two endpoints are considered coincident.
const MIN_LENGTH: f64 = 1e-9;

/// A straight segment given by origin, unit direction and length.
///
/// The direction is normalized on construction and the fields are private, so
/// every `Segment` satisfies `|direction| == 1` and `length >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    origin: Point3<f64>,
    direction: Vector3<f64>,
    length: f64,
}

impl Segment {
    /// Segment from `start` to `end`; `None` when they coincide.
    pub fn from_endpoints(start: Point3<f64>, end: Point3<f64>) -> Option<Self> {
        let span = end - start;
        let length = span.norm();
        if length < MIN_LENGTH || !length.is_finite() {
            return None;
        }
        Some(Self {
            origin: start,
            direction: span / length,
            length,
        })
    }

    /// Segment from an origin, any non-zero direction and a length.
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>, length: f64) -> Option<Self> {
        let norm = direction.norm();
        if norm < MIN_LENGTH || length.is_nan() || length < 0.0 {
            return None;
        }
        Some(Self {
            origin,
            direction: direction / norm,
            length,
        })
    }

    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vector3<f64> {
        self.direction
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Far endpoint.
    pub fn end(&self) -> Point3<f64> {
        self.point_at(self.length)
    }

    /// World point at `proximity` along the segment: `origin + direction * proximity`.
    #[inline]
    pub fn point_at(&self, proximity: f64) -> Point3<f64> {
        self.origin + self.direction * proximity
    }

    /// Whether `proximity` lies on the segment, ends included.
    #[inline]
    pub fn covers(&self, proximity: f64) -> bool {
        (0.0..=self.length).contains(&proximity)
    }
}
