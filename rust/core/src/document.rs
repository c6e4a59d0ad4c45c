// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory model repository.
//!
//! A [`Document`] owns its elements keyed by [`ElementId`] and remembers
//! insertion order, so every enumeration (ducts, pipes, walls) is
//! deterministic. A [`Project`] is the set of open documents, one of which is
//! active.

use nalgebra::Isometry3;
use rustc_hash::FxHashMap;

use crate::category::Category;
use crate::element::*;
use crate::error::{Error, Result};
use crate::ids::ElementId;
use crate::shape::Shape;
use crate::transaction::Transaction;

/// One open building-model document.
#[derive(Debug, Clone)]
pub struct Document {
    title: String,
    elements: FxHashMap<ElementId, Element>,
    order: Vec<ElementId>,
    /// Lowest id above every id in use; `None` once `u32::MAX` is taken
    next_id: Option<u32>,
}

impl Document {
    /// Create an empty document.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            elements: FxHashMap::default(),
            order: Vec::new(),
            next_id: Some(1),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Reserve a fresh element id, above every id in use.
    pub fn allocate_id(&mut self) -> Result<ElementId> {
        let id = self
            .next_id
            .ok_or_else(|| Error::IdSpaceExhausted(self.title.clone()))?;
        self.next_id = id.checked_add(1);
        Ok(ElementId(id))
    }

    /// Whether `id` is taken by an element of this document.
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Insert an element under its own id.
    pub fn insert(&mut self, element: Element) -> Result<ElementId> {
        let id = element.id();
        if self.elements.contains_key(&id) {
            return Err(Error::DuplicateElement(id));
        }
        self.next_id = match self.next_id {
            Some(next) if id.0 >= next => id.0.checked_add(1),
            other => other,
        };
        self.elements.insert(id, element);
        self.order.push(id);
        Ok(id)
    }

    /// Remove an element. References to it elsewhere are left dangling.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let removed = self.elements.remove(&id)?;
        self.order.retain(|e| *e != id);
        Some(removed)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// All elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> + '_ {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn add_level(&mut self, name: impl Into<String>, elevation: f64) -> Result<ElementId> {
        let id = self.allocate_id()?;
        self.push(Element::Level(Level {
            id,
            name: name.into(),
            elevation,
        }))
    }

    pub fn add_building_element(
        &mut self,
        category: Category,
        level: Option<ElementId>,
        shape: Shape,
    ) -> Result<ElementId> {
        let id = self.allocate_id()?;
        self.push(Element::Building(BuildingElement {
            id,
            category,
            level,
            shape,
        }))
    }

    pub fn add_conduit(
        &mut self,
        kind: ConduitKind,
        path: ConduitPath,
        diameter: f64,
    ) -> Result<ElementId> {
        let id = self.allocate_id()?;
        self.push(Element::Conduit(MepCurve {
            id,
            kind,
            path,
            diameter,
            system_name: None,
        }))
    }

    pub fn add_view_3d(
        &mut self,
        name: impl Into<String>,
        is_template: bool,
    ) -> Result<ElementId> {
        let id = self.allocate_id()?;
        self.push(Element::View(View3d {
            id,
            name: name.into(),
            is_template,
        }))
    }

    pub fn add_symbol(
        &mut self,
        family_name: impl Into<String>,
        type_name: impl Into<String>,
        category: Category,
        parameters: &[&str],
    ) -> Result<ElementId> {
        let id = self.allocate_id()?;
        self.push(Element::Symbol(FamilySymbol {
            id,
            family_name: family_name.into(),
            type_name: type_name.into(),
            category,
            is_active: false,
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
        }))
    }

    pub fn add_link(
        &mut self,
        document_title: impl Into<String>,
        transform: Isometry3<f64>,
    ) -> Result<ElementId> {
        let id = self.allocate_id()?;
        self.push(Element::Link(LinkInstance {
            id,
            document_title: document_title.into(),
            transform,
        }))
    }

    // Ids from allocate_id() are always fresh
    fn push(&mut self, element: Element) -> Result<ElementId> {
        let id = element.id();
        self.elements.insert(id, element);
        self.order.push(id);
        Ok(id)
    }

    pub fn level(&self, id: ElementId) -> Option<&Level> {
        match self.elements.get(&id) {
            Some(Element::Level(level)) => Some(level),
            _ => None,
        }
    }

    pub fn building_element(&self, id: ElementId) -> Option<&BuildingElement> {
        match self.elements.get(&id) {
            Some(Element::Building(e)) => Some(e),
            _ => None,
        }
    }

    pub fn symbol(&self, id: ElementId) -> Option<&FamilySymbol> {
        match self.elements.get(&id) {
            Some(Element::Symbol(s)) => Some(s),
            _ => None,
        }
    }

    pub fn link(&self, id: ElementId) -> Option<&LinkInstance> {
        match self.elements.get(&id) {
            Some(Element::Link(l)) => Some(l),
            _ => None,
        }
    }

    pub fn instance(&self, id: ElementId) -> Option<&FamilyInstance> {
        match self.elements.get(&id) {
            Some(Element::Instance(i)) => Some(i),
            _ => None,
        }
    }

    pub fn levels(&self) -> impl Iterator<Item = &Level> + '_ {
        self.iter().filter_map(|e| match e {
            Element::Level(level) => Some(level),
            _ => None,
        })
    }

    pub fn building_elements(&self) -> impl Iterator<Item = &BuildingElement> + '_ {
        self.iter().filter_map(|e| match e {
            Element::Building(b) => Some(b),
            _ => None,
        })
    }

    /// Ducts or pipes, in insertion order.
    pub fn conduits(&self, kind: ConduitKind) -> impl Iterator<Item = &MepCurve> + '_ {
        self.iter().filter_map(move |e| match e {
            Element::Conduit(c) if c.kind == kind => Some(c),
            _ => None,
        })
    }

    pub fn ducts(&self) -> impl Iterator<Item = &MepCurve> + '_ {
        self.conduits(ConduitKind::Duct)
    }

    pub fn pipes(&self) -> impl Iterator<Item = &MepCurve> + '_ {
        self.conduits(ConduitKind::Pipe)
    }

    pub fn views_3d(&self) -> impl Iterator<Item = &View3d> + '_ {
        self.iter().filter_map(|e| match e {
            Element::View(v) => Some(v),
            _ => None,
        })
    }

    pub fn links(&self) -> impl Iterator<Item = &LinkInstance> + '_ {
        self.iter().filter_map(|e| match e {
            Element::Link(l) => Some(l),
            _ => None,
        })
    }

    pub fn instances(&self) -> impl Iterator<Item = &FamilyInstance> + '_ {
        self.iter().filter_map(|e| match e {
            Element::Instance(i) => Some(i),
            _ => None,
        })
    }

    /// Find the first generic-model symbol of the named family.
    pub fn find_symbol(&self, family_name: &str) -> Result<&FamilySymbol> {
        self.iter()
            .find_map(|e| match e {
                Element::Symbol(s)
                    if s.category == Category::GenericModel && s.family_name == family_name =>
                {
                    Some(s)
                }
                _ => None,
            })
            .ok_or_else(|| Error::FamilyNotFound(family_name.to_string()))
    }

    /// Pick the 3D view used as ray-casting context.
    ///
    /// With a name, that view must exist and not be a template. Without one,
    /// the first non-template 3D view is used.
    pub fn spatial_view(&self, name: Option<&str>) -> Result<&View3d> {
        match name {
            Some(name) => self
                .views_3d()
                .find(|v| v.name == name && !v.is_template)
                .ok_or_else(|| Error::ViewNotFound(name.to_string())),
            None => self
                .views_3d()
                .find(|v| !v.is_template)
                .ok_or_else(|| Error::NoSpatialContext(self.title.clone())),
        }
    }

    /// Open a unit of work on this document.
    pub fn transaction(&mut self, name: impl Into<String>) -> Transaction<'_> {
        Transaction::new(self, name.into())
    }
}

/// The set of open documents.
#[derive(Debug, Clone)]
pub struct Project {
    documents: Vec<Document>,
    active: usize,
}

impl Project {
    /// Create a project whose active document is `active`.
    pub fn new(active: Document) -> Self {
        Self {
            documents: vec![active],
            active: 0,
        }
    }

    /// Open another document alongside the active one.
    pub fn open(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Make the document with exactly this title the active one.
    pub fn set_active(&mut self, title: &str) -> Result<()> {
        self.active = self
            .documents
            .iter()
            .position(|d| d.title == title)
            .ok_or_else(|| Error::DocumentNotFound(title.to_string()))?;
        Ok(())
    }

    pub fn active(&self) -> &Document {
        &self.documents[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Document {
        &mut self.documents[self.active]
    }

    /// First open document whose title contains `tag`.
    pub fn find_document(&self, tag: &str) -> Result<&Document> {
        self.documents
            .iter()
            .find(|d| d.title.contains(tag))
            .ok_or_else(|| Error::DocumentNotFound(tag.to_string()))
    }

    /// Document with exactly this title.
    pub fn document(&self, title: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.title == title)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn sample() -> Document {
        let mut doc = Document::new("AR-Main");
        let level = doc.add_level("Level 1", 0.0).unwrap();
        doc.add_building_element(
            Category::Wall,
            Some(level),
            Shape::cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)).unwrap(),
        )
        .unwrap();
        doc.add_view_3d("{3D} template", true).unwrap();
        doc.add_view_3d("Coordination", false).unwrap();
        doc.add_symbol("Openings", "Round", Category::GenericModel, &["Width", "Height"]).unwrap();
        doc
    }

    #[test]
    fn insert_rejects_duplicates_and_bumps_ids() {
        let mut doc = Document::new("X");
        doc.insert(Element::Level(Level {
            id: ElementId(40),
            name: "L".into(),
            elevation: 0.0,
        }))
        .unwrap();
        let dup = doc.insert(Element::Level(Level {
            id: ElementId(40),
            name: "L2".into(),
            elevation: 3.0,
        }));
        assert!(matches!(dup, Err(Error::DuplicateElement(ElementId(40)))));
        assert_eq!(doc.allocate_id().unwrap(), ElementId(41));
    }

    #[test]
    fn allocation_stops_at_the_top_of_the_id_space() {
        let mut doc = Document::new("AR");
        doc.insert(Element::Level(Level {
            id: ElementId(u32::MAX - 1),
            name: "L1".into(),
            elevation: 0.0,
        }))
        .unwrap();

        let last = doc.add_view_3d("{3D}", false).unwrap();
        assert_eq!(last, ElementId(u32::MAX));
        assert!(matches!(
            doc.add_symbol("Openings", "Round", Category::GenericModel, &["Width"]),
            Err(Error::IdSpaceExhausted(_))
        ));
        assert!(matches!(doc.allocate_id(), Err(Error::IdSpaceExhausted(_))));
        assert_eq!(doc.len(), 2);

        // Explicit ids below the top still go in
        doc.insert(Element::Level(Level {
            id: ElementId(7),
            name: "L0".into(),
            elevation: -3.0,
        }))
        .unwrap();
        assert!(doc.contains(ElementId(7)));
    }

    #[test]
    fn enumeration_keeps_insertion_order() {
        let mut doc = Document::new("MEP");
        let path = |x: f64| ConduitPath::Line {
            start: Point3::new(x, 0.0, 0.0),
            end: Point3::new(x, 5.0, 0.0),
        };
        let d1 = doc.add_conduit(ConduitKind::Duct, path(0.0), 0.2).unwrap();
        let p1 = doc.add_conduit(ConduitKind::Pipe, path(1.0), 0.05).unwrap();
        let d2 = doc.add_conduit(ConduitKind::Duct, path(2.0), 0.3).unwrap();

        let ducts: Vec<_> = doc.ducts().map(|c| c.id).collect();
        let pipes: Vec<_> = doc.pipes().map(|c| c.id).collect();
        assert_eq!(ducts, vec![d1, d2]);
        assert_eq!(pipes, vec![p1]);
    }

    #[test]
    fn spatial_view_skips_templates() {
        let doc = sample();
        assert_eq!(doc.spatial_view(None).unwrap().name, "Coordination");
        assert!(matches!(
            doc.spatial_view(Some("{3D} template")),
            Err(Error::ViewNotFound(_))
        ));

        let empty = Document::new("Empty");
        assert!(matches!(
            empty.spatial_view(None),
            Err(Error::NoSpatialContext(_))
        ));
    }

    #[test]
    fn find_symbol_by_family() {
        let doc = sample();
        assert_eq!(doc.find_symbol("Openings").unwrap().type_name, "Round");
        assert!(matches!(
            doc.find_symbol("Sleeves"),
            Err(Error::FamilyNotFound(_))
        ));
    }

    #[test]
    fn project_finds_document_by_tag() {
        let mut project = Project::new(sample());
        project.open(Document::new("Tower_MEP_v2"));

        assert_eq!(project.find_document("MEP").unwrap().title(), "Tower_MEP_v2");
        assert!(matches!(
            project.find_document("STR"),
            Err(Error::DocumentNotFound(_))
        ));

        project.set_active("Tower_MEP_v2").unwrap();
        assert_eq!(project.active().title(), "Tower_MEP_v2");
    }

    #[test]
    fn remove_leaves_other_elements() {
        let mut doc = sample();
        let wall = doc.building_elements().next().unwrap().id;
        assert!(doc.remove(wall).is_some());
        assert!(doc.building_element(wall).is_none());
        assert!(doc.remove(wall).is_none());
        assert_eq!(doc.levels().count(), 1);
    }
}
