// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch outcome types.

use serde::Serialize;
use sleeve_core::{ConduitKind, ElementId, SurfaceRef};

use crate::placer::{OpeningRequest, SkippedCrossing};

/// A conduit that produced no plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedConduit {
    pub conduit: ElementId,
    pub kind: ConduitKind,
    pub reason: String,
}

/// An opening created by the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedOpening {
    /// Id of the new family instance
    pub instance: ElementId,
    pub conduit: ElementId,
    pub host: SurfaceRef,
    pub level: ElementId,
    pub point: [f64; 3],
    pub proximity: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacedOpening {
    pub fn new(instance: ElementId, request: &OpeningRequest) -> Self {
        Self {
            instance,
            conduit: request.conduit,
            host: request.host,
            level: request.level,
            point: [request.point.x, request.point.y, request.point.z],
            proximity: request.proximity,
            width: request.width,
            height: request.height,
        }
    }
}

/// Summary of one placement batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Title of the MEP document conduits were read from
    pub source_document: String,
    /// Title of the document openings were placed in
    pub target_document: String,
    pub transaction: String,
    /// Conduits found in the source document
    pub conduits_total: usize,
    /// Conduits whose geometry could be cast
    pub conduits_planned: usize,
    /// Crossing candidates before deduplication
    pub raw_candidates: usize,
    /// Distinct surfaces crossed
    pub unique_crossings: usize,
    pub openings_placed: usize,
    pub skipped_conduits: Vec<SkippedConduit>,
    pub skipped_crossings: Vec<SkippedCrossing>,
    pub openings: Vec<PlacedOpening>,
    /// Time spent casting and planning (ms)
    pub plan_time_ms: u64,
    /// Time spent creating openings (ms)
    pub write_time_ms: u64,
}
