// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sleeve Geometry
//!
//! Conduit centerline extraction and ray casting of those centerlines
//! against triangulated building surfaces, accelerated by a bounding-volume
//! hierarchy and using Möller–Trumbore for the exact hit distance.

pub mod aabb;
pub mod bvh;
pub mod conduit;
pub mod error;
pub mod index;
pub mod ray;
pub mod segment;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use aabb::Aabb;
pub use bvh::Bvh;
pub use conduit::{linear_segment, Conduit, ConduitGeometry};
pub use error::{Error, Result};
pub use index::{CrossingCandidate, SpatialQuery, SurfaceIndex, SurfaceIndexBuilder};
pub use ray::ray_triangle;
pub use segment::Segment;
