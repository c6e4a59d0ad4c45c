// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Where planned openings are written.

use nalgebra::Point3;
use sleeve_core::{ElementId, StructuralType, SurfaceRef, Transaction};

/// Creates hosted family instances and sets their parameters.
pub trait PlacementSink {
    /// Make `symbol` placeable.
    fn activate(&mut self, symbol: ElementId) -> sleeve_core::Result<()>;

    /// Create one instance and return its handle.
    fn place(
        &mut self,
        point: Point3<f64>,
        symbol: ElementId,
        host: SurfaceRef,
        level: ElementId,
        structural_type: StructuralType,
    ) -> sleeve_core::Result<ElementId>;

    /// Set a numeric parameter addressed by its label.
    fn set_parameter(&mut self, instance: ElementId, label: &str, value: f64) -> sleeve_core::Result<()>;
}

impl PlacementSink for Transaction<'_> {
    fn activate(&mut self, symbol: ElementId) -> sleeve_core::Result<()> {
        self.activate_symbol(symbol)
    }

    fn place(
        &mut self,
        point: Point3<f64>,
        symbol: ElementId,
        host: SurfaceRef,
        level: ElementId,
        structural_type: StructuralType,
    ) -> sleeve_core::Result<ElementId> {
        self.place_instance(point, symbol, host, level, structural_type)
    }

    fn set_parameter(&mut self, instance: ElementId, label: &str, value: f64) -> sleeve_core::Result<()> {
        Transaction::set_parameter(self, instance, label, value)
    }
}
