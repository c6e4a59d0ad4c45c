// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! All-or-nothing unit of work over a [`Document`].
//!
//! Symbol activations and placed instances are staged inside the transaction
//! and only written to the document by [`Transaction::commit`]. Dropping the
//! transaction (explicitly through [`Transaction::rollback`], or by an early
//! `?` return) discards everything staged. Element ids handed out for staged
//! instances are not reused after a rollback.

use nalgebra::Point3;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::document::Document;
use crate::element::{Element, FamilyInstance, StructuralType};
use crate::error::{Error, Result};
use crate::ids::{ElementId, SurfaceRef};

/// Staged modifications to one document.
#[derive(Debug)]
pub struct Transaction<'a> {
    doc: &'a mut Document,
    name: String,
    activated: Vec<ElementId>,
    staged: Vec<FamilyInstance>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(doc: &'a mut Document, name: String) -> Self {
        Self {
            doc,
            name,
            activated: Vec::new(),
            staged: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read access to the document as it was when the transaction opened.
    pub fn document(&self) -> &Document {
        &*self.doc
    }

    /// Whether the symbol is active in the document or activated in this
    /// transaction.
    pub fn is_symbol_active(&self, symbol: ElementId) -> bool {
        self.activated.contains(&symbol)
            || self.doc.symbol(symbol).map(|s| s.is_active).unwrap_or(false)
    }

    /// Make a family symbol instantiable.
    pub fn activate_symbol(&mut self, symbol: ElementId) -> Result<()> {
        match self.doc.element(symbol) {
            Some(Element::Symbol(_)) => {}
            Some(other) => {
                return Err(Error::WrongElementKind {
                    id: symbol,
                    expected: "family symbol",
                    found: other.kind_name(),
                })
            }
            None => return Err(Error::ElementNotFound(symbol)),
        }
        if !self.is_symbol_active(symbol) {
            self.activated.push(symbol);
        }
        Ok(())
    }

    /// Stage a new hosted family instance and return its id.
    pub fn place_instance(
        &mut self,
        location: Point3<f64>,
        symbol: ElementId,
        host: SurfaceRef,
        level: ElementId,
        structural_type: StructuralType,
    ) -> Result<ElementId> {
        if self.doc.symbol(symbol).is_none() {
            return Err(Error::ElementNotFound(symbol));
        }
        if !self.is_symbol_active(symbol) {
            return Err(Error::SymbolNotActive(symbol));
        }

        let id = self.doc.allocate_id()?;
        self.staged.push(FamilyInstance {
            id,
            symbol,
            host,
            level,
            location,
            structural_type,
            parameters: FxHashMap::default(),
        });
        Ok(id)
    }

    /// Set a numeric parameter on a staged instance, addressed by label.
    pub fn set_parameter(&mut self, instance: ElementId, label: &str, value: f64) -> Result<()> {
        let staged = self
            .staged
            .iter_mut()
            .find(|i| i.id == instance)
            .ok_or(Error::ElementNotFound(instance))?;

        let symbol = self
            .doc
            .symbol(staged.symbol)
            .ok_or(Error::ElementNotFound(staged.symbol))?;
        if !symbol.has_parameter(label) {
            return Err(Error::ParameterNotFound {
                label: label.to_string(),
                family: symbol.family_name.clone(),
            });
        }

        staged.parameters.insert(label.to_string(), value);
        Ok(())
    }

    /// Instances staged so far.
    pub fn staged(&self) -> &[FamilyInstance] {
        &self.staged
    }

    /// Write every staged change to the document. Returns the number of
    /// instances created.
    ///
    /// Staged ids are checked before anything is written, so a failed commit
    /// leaves the document as it was.
    pub fn commit(self) -> Result<usize> {
        let Transaction {
            doc,
            activated,
            staged,
            ..
        } = self;

        let mut ids = FxHashSet::default();
        for instance in &staged {
            if doc.contains(instance.id) || !ids.insert(instance.id) {
                return Err(Error::DuplicateElement(instance.id));
            }
        }

        for id in activated {
            if let Some(Element::Symbol(symbol)) = doc.element_mut(id) {
                symbol.is_active = true;
            }
        }

        let created = staged.len();
        for instance in staged {
            doc.insert(Element::Instance(instance))?;
        }
        Ok(created)
    }

    /// Discard every staged change.
    pub fn rollback(self) {}
}
