// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangulated element shapes.
//!
//! Every surface the intersector can hit is a triangle. Walls authored from a
//! baseline are expanded to a closed 12-triangle box here, so a straight ray
//! through a wall reports two faces (entry and exit) for the same element.

use nalgebra::{Isometry3, Point3, Vector3};

use crate::error::{Error, Result};

/// Minimum length below which baselines and extents count as degenerate.
const MIN_EXTENT: f64 = 1e-9;

/// Triangle definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Calculate triangle normal
    pub fn normal(&self) -> Vector3<f64> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        edge1.cross(&edge2).normalize()
    }

    /// Calculate triangle area
    pub fn area(&self) -> f64 {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        edge1.cross(&edge2).norm() * 0.5
    }

    /// Centroid of the three vertices
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }

    /// Apply a rigid transform to all vertices
    pub fn transformed(&self, transform: &Isometry3<f64>) -> Self {
        Self {
            v0: transform * self.v0,
            v1: transform * self.v1,
            v2: transform * self.v2,
        }
    }
}

/// A triangle soup describing the boundary of an element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    triangles: Vec<Triangle>,
}

impl Shape {
    /// Wrap an existing list of triangles.
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Build the solid of a straight wall.
    ///
    /// `start` and `end` are the baseline endpoints at the wall's base
    /// elevation. The wall is centered on the baseline, `thickness` wide and
    /// `height` tall along +Z.
    pub fn wall_box(
        start: Point3<f64>,
        end: Point3<f64>,
        thickness: f64,
        height: f64,
    ) -> Result<Self> {
        let run = Vector3::new(end.x - start.x, end.y - start.y, 0.0);
        let len = run.norm();
        if len < MIN_EXTENT {
            return Err(Error::InvalidGeometry(
                "wall baseline has zero length".into(),
            ));
        }
        if thickness < MIN_EXTENT || height < MIN_EXTENT {
            return Err(Error::InvalidGeometry(format!(
                "wall thickness {} and height {} must be positive",
                thickness, height
            )));
        }

        let dir = run / len;
        let half = Vector3::new(-dir.y, dir.x, 0.0) * (thickness * 0.5);
        let base_end = Point3::new(end.x, end.y, start.z);

        // Bottom ring counter-clockwise seen from above
        let bottom = [start - half, base_end - half, base_end + half, start + half];
        Ok(Self::prism(bottom, Vector3::new(0.0, 0.0, height)))
    }

    /// Axis-aligned box between two corners (slabs, columns, test fixtures).
    pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Result<Self> {
        let extent = max - min;
        if extent.x < MIN_EXTENT || extent.y < MIN_EXTENT || extent.z < MIN_EXTENT {
            return Err(Error::InvalidGeometry(format!(
                "cuboid extent {:?} must be positive on every axis",
                extent
            )));
        }
        let bottom = [
            min,
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(min.x, max.y, min.z),
        ];
        Ok(Self::prism(bottom, Vector3::new(0.0, 0.0, extent.z)))
    }

    /// Closed prism from a counter-clockwise quad and an extrusion vector.
    fn prism(bottom: [Point3<f64>; 4], up: Vector3<f64>) -> Self {
        let top = bottom.map(|p| p + up);
        let mut triangles = Vec::with_capacity(12);

        triangles.push(Triangle::new(bottom[0], bottom[2], bottom[1]));
        triangles.push(Triangle::new(bottom[0], bottom[3], bottom[2]));
        triangles.push(Triangle::new(top[0], top[1], top[2]));
        triangles.push(Triangle::new(top[0], top[2], top[3]));

        for i in 0..4 {
            let j = (i + 1) % 4;
            triangles.push(Triangle::new(bottom[i], bottom[j], top[j]));
            triangles.push(Triangle::new(bottom[i], top[j], top[i]));
        }

        Self { triangles }
    }

    /// Apply a rigid transform (link placement) to every triangle.
    pub fn transformed(&self, transform: &Isometry3<f64>) -> Self {
        Self {
            triangles: self
                .triangles
                .iter()
                .map(|t| t.transformed(transform))
                .collect(),
        }
    }

    /// Triangles of the shape.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the shape has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Axis-aligned bounds, `None` for an empty shape.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut iter = self
            .triangles
            .iter()
            .flat_map(|t| [t.v0, t.v1, t.v2].into_iter());
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.inf(&p), hi.sup(&p))))
    }
}
