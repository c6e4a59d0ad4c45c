// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ray-triangle intersection.

use nalgebra::{Point3, Vector3};
use sleeve_core::Triangle;

/// Determinants below this mean the ray is parallel to the triangle plane.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Slack on barycentric bounds so a ray through a shared edge hits both
/// neighbouring triangles instead of slipping between them.
const EDGE_EPSILON: f64 = 1e-9;

/// Möller–Trumbore ray-triangle intersection.
///
/// Casts a ray from `origin` along `dir` and returns the ray parameter `t` of
/// the hit (`origin + dir * t`), in either direction. Callers bound `t`.
pub fn ray_triangle(origin: &Point3<f64>, dir: &Vector3<f64>, triangle: &Triangle) -> Option<f64> {
    let edge1 = triangle.v1 - triangle.v0;
    let edge2 = triangle.v2 - triangle.v0;

    let h = dir.cross(&edge2);
    let a = edge1.dot(&h);

    if a.abs() < PARALLEL_EPSILON {
        return None; // ray parallel to triangle
    }

    let f = 1.0 / a;
    let s = origin - triangle.v0;
    let u = f * s.dot(&h);

    if u < -EDGE_EPSILON || u > 1.0 + EDGE_EPSILON {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * dir.dot(&q);

    if v < -EDGE_EPSILON || u + v > 1.0 + EDGE_EPSILON {
        return None;
    }

    Some(f * edge2.dot(&q))
}
