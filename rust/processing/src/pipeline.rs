// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The placement batch.
//!
//! A batch runs in two phases. Planning reads the project: it resolves the
//! source document, opening symbol and 3D view (any failure there aborts
//! before anything is touched), builds the spatial context and plans every
//! conduit, in parallel where available. Writing then replays the plans in
//! conduit order (ducts, then pipes) into a single transaction on the active
//! document, which is committed only if every opening and every parameter
//! was set.

use std::time::Instant;

use sleeve_core::{ElementId, MepCurve, Project, StructuralType};

use crate::config::{NonLinearPolicy, PlacementConfig};
use crate::context::SpatialContext;
use crate::error::{Error, Result};
use crate::placer::{plan_conduit, ConduitPlan, OpeningRequest};
use crate::report::{BatchReport, PlacedOpening, SkippedConduit};
use crate::resolve::ProjectResolver;
use crate::sink::PlacementSink;

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

/// Read-phase result; owns no borrow of the project.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub source_document: String,
    pub target_document: String,
    /// Opening symbol to instantiate
    pub symbol: ElementId,
    pub conduits_total: usize,
    /// Plans in write order
    pub conduits: Vec<ConduitPlan>,
    pub skipped_conduits: Vec<SkippedConduit>,
    pub plan_time_ms: u64,
}

impl BatchPlan {
    /// Every request, in write order.
    pub fn requests(&self) -> impl Iterator<Item = &OpeningRequest> + '_ {
        self.conduits.iter().flat_map(|c| c.requests.iter())
    }

    pub fn request_count(&self) -> usize {
        self.conduits.iter().map(|c| c.requests.len()).sum()
    }
}

/// Places wall openings for every straight duct and pipe of the source
/// document.
#[derive(Debug, Clone)]
pub struct OpeningPipeline {
    config: PlacementConfig,
}

impl OpeningPipeline {
    pub fn new(config: PlacementConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Run the read phase.
    pub fn plan(&self, project: &Project) -> Result<BatchPlan> {
        let start = Instant::now();

        let source = project.find_document(&self.config.source_tag)?;
        let target = project.active();
        let symbol = target.find_symbol(&self.config.family_name)?;
        let view = target.spatial_view(self.config.view_name.as_deref())?;

        tracing::info!(
            source = %source.title(),
            target = %target.title(),
            family = %symbol.family_name,
            symbol_type = %symbol.type_name,
            view = %view.name,
            "Starting opening placement"
        );

        let context = SpatialContext::build(project, view);
        let resolver = ProjectResolver::new(project);
        let filter = self.config.category_filter();

        let conduits: Vec<&MepCurve> = source.ducts().chain(source.pipes()).collect();
        let outcomes = map_conduits(&conduits, self.config.parallel, |conduit| {
            plan_conduit(conduit, &context, filter, &resolver)
        });

        let mut plans = Vec::with_capacity(conduits.len());
        let mut skipped_conduits = Vec::new();
        for (conduit, outcome) in conduits.iter().zip(outcomes) {
            match outcome {
                Ok(plan) => plans.push(plan),
                Err(err) => {
                    if let Some(skipped) = self.skip_or_abort(conduit, err)? {
                        skipped_conduits.push(skipped);
                    }
                }
            }
        }

        let plan_time = start.elapsed();
        let plan = BatchPlan {
            source_document: source.title().to_string(),
            target_document: target.title().to_string(),
            symbol: symbol.id,
            conduits_total: conduits.len(),
            conduits: plans,
            skipped_conduits,
            plan_time_ms: plan_time.as_millis() as u64,
        };

        tracing::info!(
            conduits = plan.conduits_total,
            planned = plan.conduits.len(),
            skipped = plan.skipped_conduits.len(),
            requests = plan.request_count(),
            plan_time_ms = plan.plan_time_ms,
            "Planning complete"
        );
        Ok(plan)
    }

    /// Decide what a per-conduit geometry error does to the batch.
    fn skip_or_abort(
        &self,
        conduit: &MepCurve,
        err: sleeve_geometry::Error,
    ) -> Result<Option<SkippedConduit>> {
        use sleeve_geometry::Error as GeomError;

        match err {
            GeomError::NotLinearGeometry { .. } if self.config.non_linear == NonLinearPolicy::Abort => {
                Err(Error::ConduitAborted {
                    element: conduit.id,
                    source: err,
                })
            }
            GeomError::NotLinearGeometry { .. }
            | GeomError::DegenerateSegment(_)
            | GeomError::InvalidDiameter { .. } => {
                tracing::warn!(
                    conduit = %conduit.id,
                    kind = conduit.kind.as_str(),
                    reason = %err,
                    "Skipping conduit"
                );
                Ok(Some(SkippedConduit {
                    conduit: conduit.id,
                    kind: conduit.kind,
                    reason: err.to_string(),
                }))
            }
            GeomError::CoreError(_) => Err(err.into()),
        }
    }

    /// Run the write phase against any sink.
    ///
    /// Stops at the first failure; whatever was already placed is left to the
    /// caller to discard.
    pub fn write<S: PlacementSink + ?Sized>(
        &self,
        plan: &BatchPlan,
        sink: &mut S,
    ) -> Result<Vec<PlacedOpening>> {
        sink.activate(plan.symbol)?;

        let labels = [&self.config.width_parameter, &self.config.height_parameter];
        let mut placed = Vec::with_capacity(plan.request_count());
        for request in plan.requests() {
            let instance = sink.place(
                request.point,
                plan.symbol,
                request.host,
                request.level,
                StructuralType::NonStructural,
            )?;
            for (label, value) in labels.into_iter().zip([request.width, request.height]) {
                sink.set_parameter(instance, label, value)
                    .map_err(|source| Error::ParameterBinding {
                        instance,
                        label: label.clone(),
                        source,
                    })?;
            }
            placed.push(PlacedOpening::new(instance, request));
        }
        Ok(placed)
    }

    /// Plan, then place every opening in one transaction on the active
    /// document. On error the document is left unchanged.
    pub fn run(&self, project: &mut Project) -> Result<BatchReport> {
        let plan = self.plan(project)?;

        let write_start = Instant::now();
        let mut tx = project
            .active_mut()
            .transaction(self.config.transaction_name.clone());
        let openings = match self.write(&plan, &mut tx) {
            Ok(openings) => openings,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    transaction = tx.name(),
                    staged = tx.staged().len(),
                    "Placement failed, rolling back"
                );
                tx.rollback();
                return Err(err);
            }
        };
        let created = tx.commit()?;
        let write_time = write_start.elapsed();

        let report = BatchReport {
            source_document: plan.source_document,
            target_document: plan.target_document,
            transaction: self.config.transaction_name.clone(),
            conduits_total: plan.conduits_total,
            conduits_planned: plan.conduits.len(),
            raw_candidates: plan.conduits.iter().map(|c| c.raw_candidates).sum(),
            unique_crossings: plan.conduits.iter().map(|c| c.unique_crossings()).sum(),
            openings_placed: created,
            skipped_conduits: plan.skipped_conduits,
            skipped_crossings: plan
                .conduits
                .iter()
                .flat_map(|c| c.skipped.iter().copied())
                .collect(),
            openings,
            plan_time_ms: plan.plan_time_ms,
            write_time_ms: write_time.as_millis() as u64,
        };

        tracing::info!(
            openings = report.openings_placed,
            raw_candidates = report.raw_candidates,
            unique_crossings = report.unique_crossings,
            skipped_conduits = report.skipped_conduits.len(),
            skipped_crossings = report.skipped_crossings.len(),
            write_time_ms = report.write_time_ms,
            "Opening placement complete"
        );
        Ok(report)
    }
}

/// Run one batch with `config` against the project's active document.
pub fn run_batch(project: &mut Project, config: PlacementConfig) -> Result<BatchReport> {
    OpeningPipeline::new(config)?.run(project)
}

/// Apply `f` to every conduit, keeping input order in the output.
#[cfg(not(target_arch = "wasm32"))]
fn map_conduits<T, F>(conduits: &[&MepCurve], parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&MepCurve) -> T + Sync + Send,
{
    if parallel {
        conduits.par_iter().map(|c| f(*c)).collect()
    } else {
        conduits.iter().map(|c| f(*c)).collect()
    }
}

#[cfg(target_arch = "wasm32")]
fn map_conduits<T, F>(conduits: &[&MepCurve], _parallel: bool, f: F) -> Vec<T>
where
    F: Fn(&MepCurve) -> T,
{
    conduits.iter().map(|c| f(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use sleeve_core::{Category, ConduitKind, ConduitPath, Document, Shape, SurfaceRef};

    /// Sink that records calls and fails on a chosen label.
    #[derive(Default)]
    struct Recorder {
        activated: Vec<ElementId>,
        placed: Vec<(Point3<f64>, SurfaceRef)>,
        params: Vec<(ElementId, String, f64)>,
        reject_label: Option<&'static str>,
    }

    impl PlacementSink for Recorder {
        fn activate(&mut self, symbol: ElementId) -> sleeve_core::Result<()> {
            self.activated.push(symbol);
            Ok(())
        }

        fn place(
            &mut self,
            point: Point3<f64>,
            _symbol: ElementId,
            host: SurfaceRef,
            _level: ElementId,
            _structural_type: StructuralType,
        ) -> sleeve_core::Result<ElementId> {
            self.placed.push((point, host));
            Ok(ElementId(1000 + self.placed.len() as u32))
        }

        fn set_parameter(&mut self, instance: ElementId, label: &str, value: f64) -> sleeve_core::Result<()> {
            if self.reject_label == Some(label) {
                return Err(sleeve_core::Error::ParameterNotFound {
                    label: label.to_string(),
                    family: "Openings".into(),
                });
            }
            self.params.push((instance, label.to_string(), value));
            Ok(())
        }
    }

    fn project() -> Project {
        let mut ar = Document::new("Project_AR");
        let l1 = ar.add_level("L1", 0.0).unwrap();
        ar.add_view_3d("{3D}", false).unwrap();
        ar.add_symbol("Openings", "Rect", Category::GenericModel, &["Width", "Height"]).unwrap();
        for x in [2.0, 6.0] {
            let shape =
                Shape::wall_box(Point3::new(x, -5.0, 0.0), Point3::new(x, 5.0, 0.0), 0.2, 3.0).unwrap();
            ar.add_building_element(Category::Wall, Some(l1), shape).unwrap();
        }

        let mut mep = Document::new("Project_MEP");
        mep.add_conduit(
            ConduitKind::Pipe,
            ConduitPath::Line {
                start: Point3::new(0.0, 1.0, 1.0),
                end: Point3::new(8.0, 1.0, 1.0),
            },
            0.05,
        )
        .unwrap();
        mep.add_conduit(
            ConduitKind::Duct,
            ConduitPath::Line {
                start: Point3::new(0.0, -1.0, 2.0),
                end: Point3::new(4.0, -1.0, 2.0),
            },
            0.3,
        )
        .unwrap();

        let mut project = Project::new(ar);
        project.open(mep);
        project
    }

    #[test]
    fn plan_orders_ducts_before_pipes() {
        let project = project();
        let pipeline = OpeningPipeline::new(PlacementConfig::default()).unwrap();
        let plan = pipeline.plan(&project).unwrap();

        assert_eq!(plan.conduits_total, 2);
        assert_eq!(plan.conduits[0].diameter, 0.3);
        assert_eq!(plan.conduits[0].requests.len(), 1);
        assert_eq!(plan.conduits[1].diameter, 0.05);
        assert_eq!(plan.conduits[1].requests.len(), 2);
        assert_eq!(plan.request_count(), 3);
    }

    #[test]
    fn sequential_and_parallel_plans_match() {
        let project = project();
        let parallel = OpeningPipeline::new(PlacementConfig::default()).unwrap();
        let sequential = OpeningPipeline::new(PlacementConfig {
            parallel: false,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            parallel.plan(&project).unwrap().conduits,
            sequential.plan(&project).unwrap().conduits
        );
    }

    #[test]
    fn write_sets_both_labels_to_the_diameter() {
        let project = project();
        let pipeline = OpeningPipeline::new(PlacementConfig::default()).unwrap();
        let plan = pipeline.plan(&project).unwrap();

        let mut sink = Recorder::default();
        let placed = pipeline.write(&plan, &mut sink).unwrap();
        assert_eq!(sink.activated, vec![plan.symbol]);
        assert_eq!(placed.len(), 3);
        assert_eq!(sink.params.len(), 6);
        assert_eq!(sink.params[0].1, "Width");
        assert_eq!(sink.params[0].2, 0.3);
        assert_eq!(sink.params[1].1, "Height");
        assert_eq!(sink.params[1].2, 0.3);
    }

    #[test]
    fn write_stops_at_first_binding_failure() {
        let project = project();
        let pipeline = OpeningPipeline::new(PlacementConfig::default()).unwrap();
        let plan = pipeline.plan(&project).unwrap();

        let mut sink = Recorder {
            reject_label: Some("Height"),
            ..Default::default()
        };
        let err = pipeline.write(&plan, &mut sink).unwrap_err();
        assert!(matches!(err, Error::ParameterBinding { ref label, .. } if label == "Height"));
        assert_eq!(sink.placed.len(), 1);
    }

    #[test]
    fn missing_view_fails_before_planning() {
        let project = project();
        let pipeline = OpeningPipeline::new(PlacementConfig {
            view_name: Some("Coordination".into()),
            ..Default::default()
        })
        .unwrap();
        let err = pipeline.plan(&project).unwrap_err();
        assert!(err.is_configuration());
    }
}
