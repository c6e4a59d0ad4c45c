// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element kinds stored in a [`Document`](crate::Document).

use nalgebra::{Isometry3, Point3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::category::Category;
use crate::ids::{ElementId, SurfaceRef};
use crate::shape::Shape;

/// A named building storey.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub id: ElementId,
    pub name: String,
    /// Elevation of the storey above project zero
    pub elevation: f64,
}

/// A physical element with a surface: wall, floor, roof, column, ...
#[derive(Debug, Clone)]
pub struct BuildingElement {
    pub id: ElementId,
    pub category: Category,
    /// Hosting level, when the element has one
    pub level: Option<ElementId>,
    pub shape: Shape,
}

/// Duct or pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConduitKind {
    Duct,
    Pipe,
}

impl ConduitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConduitKind::Duct => "duct",
            ConduitKind::Pipe => "pipe",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            ConduitKind::Duct => Category::Duct,
            ConduitKind::Pipe => Category::Pipe,
        }
    }
}

/// Location curve of a duct or pipe.
#[derive(Debug, Clone, PartialEq)]
pub enum ConduitPath {
    /// Straight run between two endpoints
    Line { start: Point3<f64>, end: Point3<f64> },
    /// Circular arc through three points
    Arc {
        start: Point3<f64>,
        mid: Point3<f64>,
        end: Point3<f64>,
    },
    /// Chain of straight runs (flex duct, routed pipe)
    Polyline(SmallVec<[Point3<f64>; 4]>),
}

impl ConduitPath {
    /// Short name of the curve type, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConduitPath::Line { .. } => "line",
            ConduitPath::Arc { .. } => "arc",
            ConduitPath::Polyline(_) => "polyline",
        }
    }
}

/// A duct or pipe instance of the MEP model.
#[derive(Debug, Clone)]
pub struct MepCurve {
    pub id: ElementId,
    pub kind: ConduitKind,
    pub path: ConduitPath,
    /// Nominal outside diameter, in model length units
    pub diameter: f64,
    pub system_name: Option<String>,
}

/// A 3D view; ray casting needs one that is not a template.
#[derive(Debug, Clone, PartialEq)]
pub struct View3d {
    pub id: ElementId,
    pub name: String,
    pub is_template: bool,
}

/// A placeable family type.
#[derive(Debug, Clone)]
pub struct FamilySymbol {
    pub id: ElementId,
    pub family_name: String,
    pub type_name: String,
    pub category: Category,
    /// Whether the symbol has been made instantiable
    pub is_active: bool,
    /// Labels of the instance parameters the family defines
    pub parameters: Vec<String>,
}

impl FamilySymbol {
    /// Whether the family defines a parameter with this user-facing label.
    pub fn has_parameter(&self, label: &str) -> bool {
        self.parameters.iter().any(|p| p == label)
    }
}

/// Structural role flag passed to instance creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StructuralType {
    #[default]
    NonStructural,
    Beam,
    Column,
}

/// A placed family instance, e.g. a created opening.
#[derive(Debug, Clone)]
pub struct FamilyInstance {
    pub id: ElementId,
    pub symbol: ElementId,
    pub host: SurfaceRef,
    pub level: ElementId,
    pub location: Point3<f64>,
    pub structural_type: StructuralType,
    pub parameters: FxHashMap<String, f64>,
}

impl FamilyInstance {
    /// Value of a parameter by label, if it has been set.
    pub fn parameter(&self, label: &str) -> Option<f64> {
        self.parameters.get(label).copied()
    }
}

/// Placement of another document inside this one.
#[derive(Debug, Clone)]
pub struct LinkInstance {
    pub id: ElementId,
    /// Title of the linked document in the owning [`Project`](crate::Project)
    pub document_title: String,
    /// Linked-document coordinates to host coordinates
    pub transform: Isometry3<f64>,
}

/// Any element stored in a document.
#[derive(Debug, Clone)]
pub enum Element {
    Level(Level),
    Building(BuildingElement),
    Conduit(MepCurve),
    View(View3d),
    Symbol(FamilySymbol),
    Instance(FamilyInstance),
    Link(LinkInstance),
}

impl Element {
    /// Id of the wrapped element.
    pub fn id(&self) -> ElementId {
        match self {
            Element::Level(e) => e.id,
            Element::Building(e) => e.id,
            Element::Conduit(e) => e.id,
            Element::View(e) => e.id,
            Element::Symbol(e) => e.id,
            Element::Instance(e) => e.id,
            Element::Link(e) => e.id,
        }
    }

    /// Category, for elements that have one.
    pub fn category(&self) -> Option<Category> {
        match self {
            Element::Building(e) => Some(e.category),
            Element::Conduit(e) => Some(e.kind.category()),
            Element::Symbol(e) => Some(e.category),
            _ => None,
        }
    }

    /// Short kind name, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Element::Level(_) => "level",
            Element::Building(_) => "building element",
            Element::Conduit(_) => "conduit",
            Element::View(_) => "3D view",
            Element::Symbol(_) => "family symbol",
            Element::Instance(_) => "family instance",
            Element::Link(_) => "link instance",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn element_category() {
        let duct = Element::Conduit(MepCurve {
            id: ElementId(5),
            kind: ConduitKind::Duct,
            path: ConduitPath::Polyline(smallvec![Point3::origin()]),
            diameter: 0.2,
            system_name: None,
        });
        assert_eq!(duct.id(), ElementId(5));
        assert_eq!(duct.category(), Some(Category::Duct));

        let level = Element::Level(Level {
            id: ElementId(1),
            name: "L1".into(),
            elevation: 0.0,
        });
        assert_eq!(level.category(), None);
        assert_eq!(level.kind_name(), "level");
    }

    #[test]
    fn symbol_parameter_lookup() {
        let symbol = FamilySymbol {
            id: ElementId(2),
            family_name: "Openings".into(),
            type_name: "Round".into(),
            category: Category::GenericModel,
            is_active: false,
            parameters: vec!["Width".into(), "Height".into()],
        };
        assert!(symbol.has_parameter("Width"));
        assert!(!symbol.has_parameter("Depth"));
    }
}
