// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Sleeve Core
//!
//! Building model types for automated wall-penetration placement.
//!
//! ## Overview
//!
//! This crate provides the host-model side of Sleeve:
//!
//! - **Identity**: [`ElementId`] and [`SurfaceRef`], the `(link, element)` pair
//!   used to tell physical walls apart
//! - **Elements**: levels, walls and other building elements with triangulated
//!   shapes, ducts and pipes with their centerline paths, 3D views, opening
//!   family symbols and linked documents
//! - **Documents**: an in-memory [`Document`] / [`Project`] pair acting as the
//!   model repository and family provider
//! - **Unit of work**: [`Transaction`], which stages placed openings and rolls
//!   them back unless committed
//!
//! ## Quick Start
//!
//! ```rust
//! use sleeve_core::{Category, Document, Shape, Point3};
//!
//! let mut doc = Document::new("AR-Building");
//! let level = doc.add_level("Level 1", 0.0).unwrap();
//! let shape = Shape::wall_box(
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(10.0, 0.0, 0.0),
//!     0.3,
//!     3.0,
//! )
//! .unwrap();
//! let wall = doc.add_building_element(Category::Wall, Some(level), shape).unwrap();
//!
//! assert!(doc.building_element(wall).is_some());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for ids, categories and conduit kinds

pub mod category;
pub mod document;
pub mod element;
pub mod error;
pub mod ids;
pub mod shape;
pub mod transaction;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point3, Vector3};

pub use category::{Category, CategoryFilter};
pub use document::{Document, Project};
pub use element::{
    BuildingElement, ConduitKind, ConduitPath, Element, FamilyInstance, FamilySymbol, Level,
    LinkInstance, MepCurve, StructuralType, View3d,
};
pub use error::{Error, Result};
pub use ids::{ElementId, SurfaceRef};
pub use shape::{Shape, Triangle};
pub use transaction::Transaction;
