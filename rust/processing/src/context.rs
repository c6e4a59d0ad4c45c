// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ray-casting context for one batch.
//!
//! Indexes every building element of the active document, plus those of each
//! linked document moved by its link-instance transform. Linked elements are
//! indexed once per link instance, so the same wall placed twice is two
//! distinct surfaces. Nested links are not followed.

use sleeve_core::{CategoryFilter, ElementId, Project, SurfaceRef, View3d};
use sleeve_geometry::{CrossingCandidate, Segment, SpatialQuery, SurfaceIndex};

/// Immutable spatial index shared by every conduit of a batch.
#[derive(Debug, Clone)]
pub struct SpatialContext {
    view: ElementId,
    index: SurfaceIndex,
    broken_links: Vec<ElementId>,
}

impl SpatialContext {
    /// Index the active document of `project` as seen from `view`.
    pub fn build(project: &Project, view: &View3d) -> Self {
        let host = project.active();
        let mut builder = SurfaceIndex::builder();
        let mut broken_links = Vec::new();

        for element in host.building_elements() {
            builder.add(SurfaceRef::local(element.id), element.category, &element.shape);
        }

        for link in host.links() {
            let Some(linked) = project.document(&link.document_title) else {
                tracing::warn!(
                    link = %link.id,
                    document = %link.document_title,
                    "Linked document is not loaded, its elements are not indexed"
                );
                broken_links.push(link.id);
                continue;
            };
            for element in linked.building_elements() {
                builder.add_transformed(
                    SurfaceRef::linked(link.id, element.id),
                    element.category,
                    &element.shape,
                    &link.transform,
                );
            }
        }

        let index = builder.build();
        tracing::debug!(
            view = %view.id,
            surfaces = index.surface_count(),
            triangles = index.triangle_count(),
            bvh_depth = index.bvh().depth(),
            "Built spatial context"
        );

        Self {
            view: view.id,
            index,
            broken_links,
        }
    }

    /// View the context was built for.
    pub fn view(&self) -> ElementId {
        self.view
    }

    pub fn index(&self) -> &SurfaceIndex {
        &self.index
    }

    /// Link instances whose document was not loaded.
    pub fn broken_links(&self) -> &[ElementId] {
        &self.broken_links
    }
}

impl SpatialQuery for SpatialContext {
    fn intersect<'a>(
        &'a self,
        segment: &Segment,
        filter: CategoryFilter,
    ) -> Box<dyn Iterator<Item = CrossingCandidate> + 'a> {
        self.index.intersect(segment, filter)
    }
}
