// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Sleeve Processing
//!
//! Batch placement of wall openings where ducts and pipes cross walls.
//!
//! For every straight duct and pipe of the MEP document, the centerline is
//! cast against the walls of the active document (and of its linked
//! documents). Repeated hits on one wall are collapsed, each distinct crossing
//! is resolved to a hosting wall and level, and an opening sized to the
//! conduit diameter is placed at the crossing point. All openings of a batch
//! are created in one transaction.
//!
//! ```rust,no_run
//! use sleeve_core::{Document, Project};
//! use sleeve_processing::{run_batch, PlacementConfig};
//!
//! # fn main() -> sleeve_processing::Result<()> {
//! let mut project = Project::new(Document::new("Tower_AR"));
//! project.open(Document::new("Tower_MEP"));
//!
//! let report = run_batch(&mut project, PlacementConfig::default())?;
//! println!("{} openings placed", report.openings_placed);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod dedup;
pub mod error;
pub mod pipeline;
pub mod placer;
pub mod report;
pub mod resolve;
pub mod sink;

pub use config::{NonLinearPolicy, PlacementConfig};
pub use context::SpatialContext;
pub use dedup::{CrossingIterExt, UniqueCrossings};
pub use error::{Error, Result};
pub use pipeline::{run_batch, BatchPlan, OpeningPipeline};
pub use placer::{plan_conduit, ConduitPlan, OpeningRequest, SkippedCrossing};
pub use report::{BatchReport, PlacedOpening, SkippedConduit};
pub use resolve::{ProjectResolver, ResolvedHost, Unresolved, WallResolver};
pub use sink::PlacementSink;
