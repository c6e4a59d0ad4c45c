// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface index and the spatial query used to find wall crossings.
//!
//! Every triangle of every indexed element becomes one BVH primitive tagged
//! with its owner. Casting a [`Segment`] yields one [`CrossingCandidate`] per
//! triangle hit, so the same element is usually reported several times (entry
//! and exit faces, triangles sharing an edge, the same wall seen through two
//! link instances). Collapsing those duplicates is the caller's job.

use nalgebra::Isometry3;
use sleeve_core::{Category, CategoryFilter, Shape, SurfaceRef, Triangle};

use crate::aabb::Aabb;
use crate::bvh::Bvh;
use crate::ray::ray_triangle;
use crate::segment::Segment;

/// Padding added to triangle boxes so axis-aligned faces keep a volume.
const BOX_PADDING: f64 = 1e-6;

/// A raw report that a segment meets a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingCandidate {
    /// Distance from the segment origin along its direction, in `[0, length]`
    pub proximity: f64,
    /// Element owning the struck surface
    pub surface: SurfaceRef,
    pub category: Category,
}

/// Ray casting against a set of categorized surfaces.
pub trait SpatialQuery {
    /// Every crossing of `segment` with a surface whose category passes
    /// `filter`. Order is unspecified and one surface may appear many times.
    fn intersect<'a>(
        &'a self,
        segment: &Segment,
        filter: CategoryFilter,
    ) -> Box<dyn Iterator<Item = CrossingCandidate> + 'a>;
}

#[derive(Debug, Clone, Copy)]
struct Owner {
    surface: SurfaceRef,
    category: Category,
}

#[derive(Debug, Clone, Copy)]
struct Primitive {
    triangle: Triangle,
    owner: u32,
}

/// Collects surfaces before the hierarchy is built.
#[derive(Debug, Default)]
pub struct SurfaceIndexBuilder {
    owners: Vec<Owner>,
    primitives: Vec<Primitive>,
}

impl SurfaceIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the triangles of an element in host coordinates.
    pub fn add(&mut self, surface: SurfaceRef, category: Category, shape: &Shape) -> &mut Self {
        self.add_triangles(surface, category, shape.triangles().iter().copied())
    }

    /// Add the triangles of a linked element, moved into host coordinates.
    pub fn add_transformed(
        &mut self,
        surface: SurfaceRef,
        category: Category,
        shape: &Shape,
        transform: &Isometry3<f64>,
    ) -> &mut Self {
        self.add_triangles(
            surface,
            category,
            shape.triangles().iter().map(|t| t.transformed(transform)),
        )
    }

    fn add_triangles(
        &mut self,
        surface: SurfaceRef,
        category: Category,
        triangles: impl Iterator<Item = Triangle>,
    ) -> &mut Self {
        let owner = self.owners.len() as u32;
        self.owners.push(Owner { surface, category });
        self.primitives
            .extend(triangles.map(|triangle| Primitive { triangle, owner }));
        self
    }

    pub fn build(self) -> SurfaceIndex {
        let bounds: Vec<Aabb> = self
            .primitives
            .iter()
            .map(|p| Aabb::from_triangle(&p.triangle).padded(BOX_PADDING))
            .collect();
        let bvh = Bvh::build(&bounds);
        let categories = self.owners.iter().map(|o| o.category).collect();

        SurfaceIndex {
            owners: self.owners,
            primitives: self.primitives,
            bvh,
            categories,
        }
    }
}

/// BVH-accelerated set of categorized triangles.
#[derive(Debug, Clone, Default)]
pub struct SurfaceIndex {
    owners: Vec<Owner>,
    primitives: Vec<Primitive>,
    bvh: Bvh,
    categories: CategoryFilter,
}

impl SurfaceIndex {
    pub fn builder() -> SurfaceIndexBuilder {
        SurfaceIndexBuilder::new()
    }

    /// Number of indexed elements.
    pub fn surface_count(&self) -> usize {
        self.owners.len()
    }

    /// Number of indexed triangles.
    pub fn triangle_count(&self) -> usize {
        self.primitives.len()
    }

    /// Categories present in the index.
    pub fn categories(&self) -> CategoryFilter {
        self.categories
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Whether an element is indexed under this reference.
    pub fn contains(&self, surface: &SurfaceRef) -> bool {
        self.owners.iter().any(|o| o.surface == *surface)
    }
}

impl SpatialQuery for SurfaceIndex {
    fn intersect<'a>(
        &'a self,
        segment: &Segment,
        filter: CategoryFilter,
    ) -> Box<dyn Iterator<Item = CrossingCandidate> + 'a> {
        if !self.categories.iter().any(|c| filter.contains(c)) {
            return Box::new(std::iter::empty());
        }

        let segment = *segment;
        let origin = segment.origin();
        let dir = segment.direction();

        Box::new(
            self.bvh
                .traverse(origin, dir, segment.length())
                .filter_map(move |index| {
                    let primitive = &self.primitives[index as usize];
                    let owner = &self.owners[primitive.owner as usize];
                    if !filter.contains(owner.category) {
                        return None;
                    }
                    let t = ray_triangle(&origin, &dir, &primitive.triangle)?;
                    segment.covers(t).then_some(CrossingCandidate {
                        proximity: t,
                        surface: owner.surface,
                        category: owner.category,
                    })
                }),
        )
    }
}
