// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON scene files.
//!
//! A scene lists the open documents of a project: levels, 3D views, family
//! symbols, building elements, ducts and pipes, and link instances. Element
//! ids may be given explicitly (needed whenever something refers to the
//! element) or left out to be allocated.

use nalgebra::{Isometry3, Point3, Vector3};
use serde::Deserialize;
use sleeve_core::{
    BuildingElement, Category, ConduitKind, ConduitPath, Document, Element, ElementId,
    FamilySymbol, Level, LinkInstance, MepCurve, Project, Shape, Triangle, View3d,
};
use thiserror::Error;

/// Errors raised while turning a scene file into a project.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Scene parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model error: {0}")]
    Model(#[from] sleeve_core::Error),

    #[error("Scene contains no documents")]
    Empty,

    #[error("Active document '{0}' is not in the scene")]
    UnknownActive(String),

    #[error("Element {element} in '{document}' refers to unknown level {level}")]
    UnknownLevel {
        document: String,
        element: ElementId,
        level: ElementId,
    },

    #[error("Mesh of element {element} has triangle index {index} out of {vertices} vertices")]
    MeshIndex {
        element: ElementId,
        index: usize,
        vertices: usize,
    },
}

pub type Result<T> = std::result::Result<T, SceneError>;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneFile {
    /// Title of the document openings are placed in; first document if unset
    #[serde(default)]
    pub active: Option<String>,
    pub documents: Vec<DocumentSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentSpec {
    pub title: String,
    #[serde(default)]
    pub levels: Vec<LevelSpec>,
    #[serde(default)]
    pub views: Vec<ViewSpec>,
    #[serde(default)]
    pub symbols: Vec<SymbolSpec>,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
    #[serde(default)]
    pub conduits: Vec<ConduitSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelSpec {
    pub id: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub elevation: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewSpec {
    pub id: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub template: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SymbolSpec {
    pub id: Option<u32>,
    pub family: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default = "generic_model")]
    pub category: Category,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub parameters: Vec<String>,
}

fn generic_model() -> Category {
    Category::GenericModel
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementSpec {
    pub id: Option<u32>,
    pub category: Category,
    pub level: Option<u32>,
    pub shape: ShapeSpec,
}

/// Element solid.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeSpec {
    /// Straight wall from its baseline
    Wall {
        start: [f64; 3],
        end: [f64; 3],
        thickness: f64,
        height: f64,
        #[serde(default)]
        base_offset: f64,
    },
    /// Axis-aligned box
    #[serde(rename = "box")]
    Cuboid { min: [f64; 3], max: [f64; 3] },
    /// Indexed triangle mesh
    Mesh {
        vertices: Vec<[f64; 3]>,
        triangles: Vec<[usize; 3]>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConduitSpec {
    pub id: Option<u32>,
    pub kind: ConduitKind,
    pub diameter: f64,
    #[serde(default)]
    pub system: Option<String>,
    pub path: PathSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSpec {
    Line { start: [f64; 3], end: [f64; 3] },
    Arc {
        start: [f64; 3],
        mid: [f64; 3],
        end: [f64; 3],
    },
    Polyline(Vec<[f64; 3]>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkSpec {
    pub id: Option<u32>,
    /// Title of the linked document
    pub document: String,
    #[serde(default)]
    pub translation: [f64; 3],
    /// Rotation about +Z, in degrees
    #[serde(default)]
    pub rotation_deg: f64,
}

impl SceneFile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the in-memory project.
    pub fn into_project(self) -> Result<Project> {
        let active_title = match &self.active {
            Some(title) => title.clone(),
            None => self
                .documents
                .first()
                .map(|d| d.title.clone())
                .ok_or(SceneError::Empty)?,
        };

        let mut documents = self
            .documents
            .into_iter()
            .map(DocumentSpec::into_document)
            .collect::<Result<Vec<_>>>()?;

        let active = documents
            .iter()
            .position(|d| d.title() == active_title)
            .ok_or_else(|| SceneError::UnknownActive(active_title.clone()))?;

        let mut project = Project::new(documents.remove(active));
        for document in documents {
            project.open(document);
        }
        Ok(project)
    }
}

fn id_or_next(doc: &mut Document, id: Option<u32>) -> Result<ElementId> {
    match id {
        Some(id) => Ok(ElementId(id)),
        None => Ok(doc.allocate_id()?),
    }
}

impl DocumentSpec {
    fn into_document(self) -> Result<Document> {
        let mut doc = Document::new(self.title.clone());

        // Levels first so elements can refer to them
        for level in self.levels {
            let id = id_or_next(&mut doc, level.id)?;
            doc.insert(Element::Level(Level {
                id,
                name: level.name,
                elevation: level.elevation,
            }))?;
        }

        for view in self.views {
            let id = id_or_next(&mut doc, view.id)?;
            doc.insert(Element::View(View3d {
                id,
                name: view.name,
                is_template: view.template,
            }))?;
        }

        for symbol in self.symbols {
            let id = id_or_next(&mut doc, symbol.id)?;
            doc.insert(Element::Symbol(FamilySymbol {
                id,
                family_name: symbol.family,
                type_name: symbol.type_name,
                category: symbol.category,
                is_active: symbol.active,
                parameters: symbol.parameters,
            }))?;
        }

        for element in self.elements {
            let id = id_or_next(&mut doc, element.id)?;
            let level = element.level.map(ElementId);
            if let Some(level) = level {
                if doc.level(level).is_none() {
                    return Err(SceneError::UnknownLevel {
                        document: self.title.clone(),
                        element: id,
                        level,
                    });
                }
            }
            doc.insert(Element::Building(BuildingElement {
                id,
                category: element.category,
                level,
                shape: element.shape.into_shape(id)?,
            }))?;
        }

        for conduit in self.conduits {
            let id = id_or_next(&mut doc, conduit.id)?;
            doc.insert(Element::Conduit(MepCurve {
                id,
                kind: conduit.kind,
                path: conduit.path.into_path(),
                diameter: conduit.diameter,
                system_name: conduit.system,
            }))?;
        }

        for link in self.links {
            let id = id_or_next(&mut doc, link.id)?;
            doc.insert(Element::Link(LinkInstance {
                id,
                document_title: link.document,
                transform: link_transform(link.translation, link.rotation_deg),
            }))?;
        }

        Ok(doc)
    }
}

impl ShapeSpec {
    fn into_shape(self, element: ElementId) -> Result<Shape> {
        let shape = match self {
            ShapeSpec::Wall {
                start,
                end,
                thickness,
                height,
                base_offset,
            } => {
                let lift = Vector3::new(0.0, 0.0, base_offset);
                Shape::wall_box(
                    Point3::from(start) + lift,
                    Point3::from(end) + lift,
                    thickness,
                    height,
                )?
            }
            ShapeSpec::Cuboid { min, max } => Shape::cuboid(Point3::from(min), Point3::from(max))?,
            ShapeSpec::Mesh {
                vertices,
                triangles,
            } => {
                let vertex = |index: usize| {
                    vertices
                        .get(index)
                        .map(|v| Point3::from(*v))
                        .ok_or(SceneError::MeshIndex {
                            element,
                            index,
                            vertices: vertices.len(),
                        })
                };
                let triangles = triangles
                    .iter()
                    .map(|[a, b, c]| -> Result<Triangle> {
                        Ok(Triangle::new(vertex(*a)?, vertex(*b)?, vertex(*c)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Shape::from_triangles(triangles)
            }
        };
        Ok(shape)
    }
}

impl PathSpec {
    fn into_path(self) -> ConduitPath {
        match self {
            PathSpec::Line { start, end } => ConduitPath::Line {
                start: Point3::from(start),
                end: Point3::from(end),
            },
            PathSpec::Arc { start, mid, end } => ConduitPath::Arc {
                start: Point3::from(start),
                mid: Point3::from(mid),
                end: Point3::from(end),
            },
            PathSpec::Polyline(points) => {
                ConduitPath::Polyline(points.into_iter().map(Point3::from).collect())
            }
        }
    }
}

/// Link placement: rotation about +Z, then translation.
fn link_transform(translation: [f64; 3], rotation_deg: f64) -> Isometry3<f64> {
    Isometry3::new(
        Vector3::from(translation),
        Vector3::z() * rotation_deg.to_radians(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sleeve_core::SurfaceRef;

    const TOWER: &str = include_str!("../scenes/tower.json");

    #[test]
    fn bundled_scene_loads() {
        let project = SceneFile::from_json(TOWER).unwrap().into_project().unwrap();
        assert_eq!(project.active().title(), "Tower_AR");
        assert_eq!(project.documents().len(), 3);

        let mep = project.find_document("MEP").unwrap();
        assert_eq!(mep.ducts().count(), 2);
        assert_eq!(mep.pipes().count(), 2);

        let ar = project.active();
        assert!(ar.find_symbol("Openings").is_ok());
        assert_eq!(ar.links().count(), 1);
    }

    #[test]
    fn bundled_scene_runs() {
        let mut project = SceneFile::from_json(TOWER).unwrap().into_project().unwrap();
        let report =
            sleeve_processing::run_batch(&mut project, sleeve_processing::PlacementConfig::default())
                .unwrap();

        assert_eq!(report.skipped_conduits.len(), 1);
        assert!(report.openings_placed > 0);
        assert!(report.openings.iter().any(|o| o.host.is_linked()));
        assert!(report.openings.iter().any(|o| o.host == SurfaceRef::local(ElementId(10))));
    }

    #[test]
    fn rotation_is_about_z() {
        let t = link_transform([1.0, 0.0, 0.0], 90.0);
        let p = t * Point3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(p, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn unknown_level_is_reported() {
        let json = r#"{
            "documents": [{
                "title": "AR",
                "elements": [{
                    "id": 5, "category": "wall", "level": 9,
                    "shape": { "box": { "min": [0, 0, 0], "max": [1, 1, 1] } }
                }]
            }]
        }"#;
        let err = SceneFile::from_json(json).unwrap().into_project().unwrap_err();
        assert!(matches!(err, SceneError::UnknownLevel { level: ElementId(9), .. }));
    }

    #[test]
    fn mesh_index_is_checked() {
        let json = r#"{
            "documents": [{
                "title": "AR",
                "elements": [{
                    "category": "wall",
                    "shape": { "mesh": { "vertices": [[0, 0, 0], [1, 0, 0]], "triangles": [[0, 1, 2]] } }
                }]
            }]
        }"#;
        let err = SceneFile::from_json(json).unwrap().into_project().unwrap_err();
        assert!(matches!(err, SceneError::MeshIndex { index: 2, vertices: 2, .. }));
    }

    #[test]
    fn active_must_exist() {
        let json = r#"{ "active": "AR", "documents": [{ "title": "MEP" }] }"#;
        let err = SceneFile::from_json(json).unwrap().into_project().unwrap_err();
        assert!(matches!(err, SceneError::UnknownActive(_)));

        let empty = SceneFile::from_json(r#"{ "documents": [] }"#).unwrap();
        assert!(matches!(empty.into_project(), Err(SceneError::Empty)));
    }

    #[test]
    fn ids_past_the_top_are_reported() {
        let json = r#"{
            "documents": [{
                "title": "AR",
                "levels": [{ "id": 4294967295, "name": "L1" }],
                "views": [{ "name": "{3D}" }]
            }]
        }"#;
        let err = SceneFile::from_json(json).unwrap().into_project().unwrap_err();
        assert!(matches!(
            err,
            SceneError::Model(sleeve_core::Error::IdSpaceExhausted(_))
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = r#"{
            "documents": [{
                "title": "AR",
                "levels": [{ "id": 1, "name": "L1" }],
                "views": [{ "id": 1, "name": "{3D}" }]
            }]
        }"#;
        let err = SceneFile::from_json(json).unwrap().into_project().unwrap_err();
        assert!(matches!(err, SceneError::Model(sleeve_core::Error::DuplicateElement(_))));
    }
}
