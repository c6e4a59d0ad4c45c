// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolution of crossed surfaces to host walls and levels.

use serde::Serialize;
use sleeve_core::{Category, Document, ElementId, Level, Project, SurfaceRef};

/// Elevation slack when matching a linked level to a host level.
const LEVEL_TOLERANCE: f64 = 1e-6;

/// Wall and level an opening is hosted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedHost {
    pub wall: SurfaceRef,
    /// Level of the active document the opening is placed on
    pub level: ElementId,
}

/// Why a crossed surface cannot host an opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unresolved {
    /// The element no longer exists
    MissingElement,
    /// The link instance or its document is gone
    BrokenLink,
    /// The element exists but is not a wall
    NotAWall,
    /// The wall has no level usable in the active document
    NoLevel,
}

impl Unresolved {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unresolved::MissingElement => "element not found",
            Unresolved::BrokenLink => "link not loaded",
            Unresolved::NotAWall => "not a wall",
            Unresolved::NoLevel => "no level",
        }
    }
}

impl std::fmt::Display for Unresolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Looks up the wall and level behind a crossed surface.
pub trait WallResolver {
    fn resolve_wall(&self, surface: &SurfaceRef) -> Result<ResolvedHost, Unresolved>;
}

impl<R: WallResolver + ?Sized> WallResolver for &R {
    fn resolve_wall(&self, surface: &SurfaceRef) -> Result<ResolvedHost, Unresolved> {
        (**self).resolve_wall(surface)
    }
}

/// Resolves surfaces against the active document of a [`Project`] and the
/// documents its link instances point to.
#[derive(Debug, Clone, Copy)]
pub struct ProjectResolver<'a> {
    project: &'a Project,
}

impl<'a> ProjectResolver<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }

    fn wall_level(doc: &Document, element: ElementId) -> Result<Option<&Level>, Unresolved> {
        let wall = doc
            .building_element(element)
            .ok_or(Unresolved::MissingElement)?;
        if wall.category != Category::Wall {
            return Err(Unresolved::NotAWall);
        }
        Ok(wall.level.and_then(|id| doc.level(id)))
    }
}

impl WallResolver for ProjectResolver<'_> {
    fn resolve_wall(&self, surface: &SurfaceRef) -> Result<ResolvedHost, Unresolved> {
        let host = self.project.active();

        let level = match surface.link {
            None => Self::wall_level(host, surface.element)?
                .ok_or(Unresolved::NoLevel)?
                .id,
            Some(link_id) => {
                let link = host.link(link_id).ok_or(Unresolved::BrokenLink)?;
                let linked = self
                    .project
                    .document(&link.document_title)
                    .ok_or(Unresolved::BrokenLink)?;
                let linked_level =
                    Self::wall_level(linked, surface.element)?.ok_or(Unresolved::NoLevel)?;
                let elevation = linked_level.elevation + link.transform.translation.vector.z;
                host_level_for(host, &linked_level.name, elevation).ok_or(Unresolved::NoLevel)?
            }
        };

        Ok(ResolvedHost {
            wall: *surface,
            level,
        })
    }
}

/// Level of `host` matching a linked level: same name first, otherwise the
/// highest level at or below `elevation`.
fn host_level_for(host: &Document, name: &str, elevation: f64) -> Option<ElementId> {
    if let Some(level) = host.levels().find(|l| l.name == name) {
        return Some(level.id);
    }
    host.levels()
        .filter(|l| l.elevation <= elevation + LEVEL_TOLERANCE)
        .max_by(|a, b| a.elevation.total_cmp(&b.elevation))
        .map(|l| l.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Isometry3, Point3};
    use sleeve_core::Shape;

    fn wall_shape() -> Shape {
        Shape::wall_box(Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0), 0.2, 3.0).unwrap()
    }

    #[test]
    fn local_wall_resolves_to_its_level() {
        let mut ar = Document::new("AR");
        let level = ar.add_level("L1", 0.0).unwrap();
        let wall = ar.add_building_element(Category::Wall, Some(level), wall_shape()).unwrap();
        let floor = ar.add_building_element(Category::Floor, Some(level), wall_shape()).unwrap();
        let orphan = ar.add_building_element(Category::Wall, None, wall_shape()).unwrap();
        let project = Project::new(ar);
        let resolver = ProjectResolver::new(&project);

        let host = resolver.resolve_wall(&SurfaceRef::local(wall)).unwrap();
        assert_eq!(host.level, level);
        assert_eq!(
            resolver.resolve_wall(&SurfaceRef::local(floor)),
            Err(Unresolved::NotAWall)
        );
        assert_eq!(
            resolver.resolve_wall(&SurfaceRef::local(orphan)),
            Err(Unresolved::NoLevel)
        );
        assert_eq!(
            resolver.resolve_wall(&SurfaceRef::local(ElementId(9999))),
            Err(Unresolved::MissingElement)
        );
    }

    #[test]
    fn linked_wall_maps_level_by_name_then_elevation() {
        let mut structure = Document::new("ST");
        let st_l1 = structure.add_level("L1", 0.0).unwrap();
        let st_l2 = structure.add_level("Roof", 6.0).unwrap();
        let w1 = structure.add_building_element(Category::Wall, Some(st_l1), wall_shape()).unwrap();
        let w2 = structure.add_building_element(Category::Wall, Some(st_l2), wall_shape()).unwrap();

        let mut ar = Document::new("AR");
        let l1 = ar.add_level("L1", 0.0).unwrap();
        let l2 = ar.add_level("L2", 3.0).unwrap();
        let link = ar.add_link("ST", Isometry3::translation(0.0, 0.0, 0.5)).unwrap();
        let dangling = ar.add_link("Missing", Isometry3::translation(0.0, 0.0, 0.0)).unwrap();

        let mut project = Project::new(ar);
        project.open(structure);
        let resolver = ProjectResolver::new(&project);

        let by_name = resolver.resolve_wall(&SurfaceRef::linked(link, w1)).unwrap();
        assert_eq!(by_name.level, l1);
        assert!(by_name.wall.is_linked());

        // "Roof" is not a host level; 6.5 falls back to L2 at 3.0
        let by_elevation = resolver.resolve_wall(&SurfaceRef::linked(link, w2)).unwrap();
        assert_eq!(by_elevation.level, l2);

        assert_eq!(
            resolver.resolve_wall(&SurfaceRef::linked(dangling, w1)),
            Err(Unresolved::BrokenLink)
        );
        assert_eq!(
            resolver.resolve_wall(&SurfaceRef::linked(ElementId(4242), w1)),
            Err(Unresolved::BrokenLink)
        );
    }
}
