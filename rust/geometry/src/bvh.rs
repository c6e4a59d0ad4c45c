// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounding-volume hierarchy over primitive boxes.
//!
//! Built top-down by splitting at the median centroid along the longest axis
//! of the centroid bounds. Nodes live in one flat vector; leaves reference a
//! contiguous range of the reordered primitive index list.
//!
//! Ray traversal is lazy: [`RayTraversal`] keeps an explicit node stack and
//! yields the primitives of each leaf whose box the ray enters before `t_max`.

use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;

use crate::aabb::Aabb;

/// Maximum number of primitives stored in one leaf.
const MAX_LEAF_SIZE: usize = 4;

/// Centroid spreads below this are not worth splitting.
const MIN_SPLIT_EXTENT: f64 = 1e-12;

#[derive(Debug, Clone)]
enum BvhNode {
    Leaf { bounds: Aabb, start: u32, count: u32 },
    Interior { bounds: Aabb, left: u32, right: u32 },
}

impl BvhNode {
    fn bounds(&self) -> &Aabb {
        match self {
            BvhNode::Leaf { bounds, .. } | BvhNode::Interior { bounds, .. } => bounds,
        }
    }
}

/// Flat bounding-volume hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    indices: Vec<u32>,
}

impl Bvh {
    /// Build a hierarchy over the given primitive bounds.
    ///
    /// Primitive `i` of the input is reported as index `i` during traversal.
    pub fn build(bounds: &[Aabb]) -> Self {
        let mut bvh = Self {
            nodes: Vec::with_capacity(bounds.len().max(1) * 2 / MAX_LEAF_SIZE + 1),
            indices: (0..bounds.len() as u32).collect(),
        };
        if bounds.is_empty() {
            return bvh;
        }

        let centroids: Vec<Point3<f64>> = bounds.iter().map(|b| b.center()).collect();
        bvh.build_node(bounds, &centroids, 0, bounds.len());
        bvh
    }

    fn build_node(
        &mut self,
        bounds: &[Aabb],
        centroids: &[Point3<f64>],
        start: usize,
        end: usize,
    ) -> u32 {
        let slice = &self.indices[start..end];
        let node_bounds = slice
            .iter()
            .fold(Aabb::empty(), |acc, &i| acc.union(&bounds[i as usize]));
        let count = end - start;

        let centroid_bounds = slice
            .iter()
            .fold(Aabb::empty(), |acc, &i| acc.grow(&centroids[i as usize]));
        let axis = centroid_bounds.longest_axis();

        if count <= MAX_LEAF_SIZE || centroid_bounds.extent()[axis] < MIN_SPLIT_EXTENT {
            let index = self.nodes.len() as u32;
            self.nodes.push(BvhNode::Leaf {
                bounds: node_bounds,
                start: start as u32,
                count: count as u32,
            });
            return index;
        }

        let half = count / 2;
        self.indices[start..end].select_nth_unstable_by(half, |&a, &b| {
            centroids[a as usize][axis].total_cmp(&centroids[b as usize][axis])
        });

        // Reserve the slot, children are appended after it
        let index = self.nodes.len() as u32;
        self.nodes.push(BvhNode::Leaf {
            bounds: node_bounds,
            start: 0,
            count: 0,
        });

        let left = self.build_node(bounds, centroids, start, start + half);
        let right = self.build_node(bounds, centroids, start + half, end);
        self.nodes[index as usize] = BvhNode::Interior {
            bounds: node_bounds,
            left,
            right,
        };
        index
    }

    /// Number of nodes (interior and leaf).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of indexed primitives.
    pub fn primitive_count(&self) -> usize {
        self.indices.len()
    }

    /// Depth of the deepest leaf; 0 for an empty hierarchy.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[BvhNode], node: u32) -> usize {
            match &nodes[node as usize] {
                BvhNode::Leaf { .. } => 1,
                BvhNode::Interior { left, right, .. } => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Bounds of the whole hierarchy.
    pub fn bounds(&self) -> Aabb {
        self.nodes.first().map(|n| *n.bounds()).unwrap_or_default()
    }

    /// Lazily enumerate primitives whose leaf box the ray enters within
    /// `[0, t_max]`. Candidates still need an exact primitive test.
    pub fn traverse(&self, origin: Point3<f64>, dir: Vector3<f64>, t_max: f64) -> RayTraversal<'_> {
        let mut stack = SmallVec::new();
        if !self.nodes.is_empty() {
            stack.push(0);
        }
        RayTraversal {
            bvh: self,
            origin,
            dir,
            t_max,
            stack,
            leaf: 0..0,
        }
    }
}

/// Iterator over candidate primitive indices along a ray.
#[derive(Debug, Clone)]
pub struct RayTraversal<'a> {
    bvh: &'a Bvh,
    origin: Point3<f64>,
    dir: Vector3<f64>,
    t_max: f64,
    stack: SmallVec<[u32; 32]>,
    leaf: std::ops::Range<usize>,
}

impl Iterator for RayTraversal<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        loop {
            if let Some(slot) = self.leaf.next() {
                return Some(self.bvh.indices[slot]);
            }

            let node = &self.bvh.nodes[self.stack.pop()? as usize];
            if node
                .bounds()
                .ray_interval(&self.origin, &self.dir, self.t_max)
                .is_none()
            {
                continue;
            }

            match node {
                BvhNode::Leaf { start, count, .. } => {
                    let start = *start as usize;
                    self.leaf = start..start + *count as usize;
                }
                BvhNode::Interior { left, right, .. } => {
                    self.stack.push(*right);
                    self.stack.push(*left);
                }
            }
        }
    }
}
