// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-conduit planning: cast, deduplicate, resolve, size.

use nalgebra::Point3;
use serde::Serialize;
use sleeve_core::{CategoryFilter, ElementId, SurfaceRef};
use sleeve_geometry::{Conduit, SpatialQuery};

use crate::dedup::CrossingIterExt;
use crate::resolve::{Unresolved, WallResolver};

/// One opening to create in the active document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningRequest {
    /// Conduit that caused the opening
    pub conduit: ElementId,
    /// Crossing point in host coordinates
    pub point: Point3<f64>,
    pub host: SurfaceRef,
    pub level: ElementId,
    pub width: f64,
    pub height: f64,
    /// Distance from the conduit start to `point`
    pub proximity: f64,
}

/// A unique crossing that could not be turned into a request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkippedCrossing {
    pub conduit: ElementId,
    pub surface: SurfaceRef,
    pub reason: Unresolved,
}

/// Everything planned for one conduit.
#[derive(Debug, Clone, PartialEq)]
pub struct ConduitPlan {
    pub conduit: ElementId,
    pub diameter: f64,
    /// Candidates reported by the spatial query, duplicates included
    pub raw_candidates: usize,
    pub requests: Vec<OpeningRequest>,
    pub skipped: Vec<SkippedCrossing>,
}

impl ConduitPlan {
    /// Unique surfaces crossed, resolved or not.
    pub fn unique_crossings(&self) -> usize {
        self.requests.len() + self.skipped.len()
    }
}

/// Plan the openings of one conduit.
///
/// Depends only on the conduit geometry, the query and the resolver; nothing
/// is written. Requests come out in the order the query reported their first
/// candidate.
pub fn plan_conduit<C, Q, R>(
    conduit: &C,
    query: &Q,
    filter: CategoryFilter,
    resolver: &R,
) -> sleeve_geometry::Result<ConduitPlan>
where
    C: Conduit + ?Sized,
    Q: SpatialQuery + ?Sized,
    R: WallResolver + ?Sized,
{
    let geometry = conduit.geometry()?;
    let segment = geometry.segment;

    let mut plan = ConduitPlan {
        conduit: geometry.element,
        diameter: geometry.diameter,
        raw_candidates: 0,
        requests: Vec::new(),
        skipped: Vec::new(),
    };

    let mut crossings = query.intersect(&segment, filter).unique_crossings();
    for crossing in crossings.by_ref() {
        match resolver.resolve_wall(&crossing.surface) {
            Ok(host) => plan.requests.push(OpeningRequest {
                conduit: geometry.element,
                point: segment.point_at(crossing.proximity),
                host: host.wall,
                level: host.level,
                width: geometry.diameter,
                height: geometry.diameter,
                proximity: crossing.proximity,
            }),
            Err(reason) => {
                tracing::debug!(
                    conduit = %geometry.element,
                    surface = %crossing.surface,
                    reason = %reason,
                    "Skipping unresolvable crossing"
                );
                plan.skipped.push(SkippedCrossing {
                    conduit: geometry.element,
                    surface: crossing.surface,
                    reason,
                });
            }
        }
    }
    plan.raw_candidates = crossings.raw_count();

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ResolvedHost;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use sleeve_core::{Category, ConduitKind, ConduitPath, MepCurve};
    use sleeve_geometry::{CrossingCandidate, Segment};

    /// Query returning a fixed list, whatever the segment.
    struct Canned(Vec<CrossingCandidate>);

    impl SpatialQuery for Canned {
        fn intersect<'a>(
            &'a self,
            _segment: &Segment,
            filter: CategoryFilter,
        ) -> Box<dyn Iterator<Item = CrossingCandidate> + 'a> {
            Box::new(self.0.iter().copied().filter(move |c| filter.contains(c.category)))
        }
    }

    /// Every wall sits on level #1, except element #99 which is gone.
    struct AllOnLevelOne;

    impl WallResolver for AllOnLevelOne {
        fn resolve_wall(&self, surface: &SurfaceRef) -> Result<ResolvedHost, Unresolved> {
            if surface.element == ElementId(99) {
                return Err(Unresolved::MissingElement);
            }
            Ok(ResolvedHost {
                wall: *surface,
                level: ElementId(1),
            })
        }
    }

    fn duct(diameter: f64) -> MepCurve {
        MepCurve {
            id: ElementId(50),
            kind: ConduitKind::Duct,
            path: ConduitPath::Line {
                start: Point3::origin(),
                end: Point3::new(10.0, 0.0, 0.0),
            },
            diameter,
            system_name: None,
        }
    }

    fn hit(proximity: f64, element: u32, category: Category) -> CrossingCandidate {
        CrossingCandidate {
            proximity,
            surface: SurfaceRef::local(ElementId(element)),
            category,
        }
    }

    #[test]
    fn duplicate_hits_yield_one_request_at_the_right_point() {
        let query = Canned(vec![
            hit(4.0, 7, Category::Wall),
            hit(4.0001, 7, Category::Wall),
        ]);
        let plan = plan_conduit(&duct(0.25), &query, CategoryFilter::walls(), &AllOnLevelOne).unwrap();

        assert_eq!(plan.raw_candidates, 2);
        assert_eq!(plan.requests.len(), 1);
        let request = &plan.requests[0];
        assert_relative_eq!(request.point, Point3::new(4.0, 0.0, 0.0), epsilon = 1e-12);
        assert_eq!(request.width, 0.25);
        assert_eq!(request.height, 0.25);
        assert_eq!(request.level, ElementId(1));
        assert_eq!(request.conduit, ElementId(50));
    }

    #[test]
    fn no_crossings_is_an_empty_plan() {
        let plan = plan_conduit(&duct(0.1), &Canned(vec![]), CategoryFilter::walls(), &AllOnLevelOne)
            .unwrap();
        assert!(plan.requests.is_empty());
        assert_eq!(plan.unique_crossings(), 0);
    }

    #[test]
    fn floors_never_become_requests() {
        let query = Canned(vec![hit(1.0, 3, Category::Floor), hit(2.0, 4, Category::Wall)]);
        let plan = plan_conduit(&duct(0.1), &query, CategoryFilter::walls(), &AllOnLevelOne).unwrap();
        assert_eq!(plan.requests.len(), 1);
        assert_eq!(plan.requests[0].host, SurfaceRef::local(ElementId(4)));
    }

    #[test]
    fn unresolvable_crossing_is_skipped() {
        let query = Canned(vec![hit(1.0, 99, Category::Wall), hit(2.0, 4, Category::Wall)]);
        let plan = plan_conduit(&duct(0.1), &query, CategoryFilter::walls(), &AllOnLevelOne).unwrap();
        assert_eq!(plan.requests.len(), 1);
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].reason, Unresolved::MissingElement);
        assert_eq!(plan.unique_crossings(), 2);
    }

    #[test]
    fn arc_fails_before_casting() {
        let mut arc = duct(0.1);
        arc.path = ConduitPath::Arc {
            start: Point3::origin(),
            mid: Point3::new(1.0, 1.0, 0.0),
            end: Point3::new(2.0, 0.0, 0.0),
        };
        let err = plan_conduit(&arc, &Canned(vec![]), CategoryFilter::walls(), &AllOnLevelOne)
            .unwrap_err();
        assert!(matches!(err, sleeve_geometry::Error::NotLinearGeometry { .. }));
    }

    #[test]
    fn point_follows_direction() {
        let mut diagonal = duct(0.1);
        diagonal.path = ConduitPath::Line {
            start: Point3::new(1.0, 1.0, 0.0),
            end: Point3::new(1.0, 1.0, 6.0),
        };
        let query = Canned(vec![hit(2.5, 4, Category::Wall)]);
        let plan = plan_conduit(&diagonal, &query, CategoryFilter::walls(), &AllOnLevelOne).unwrap();
        assert_relative_eq!(
            plan.requests[0].point,
            Point3::new(1.0, 1.0, 0.0) + Vector3::z() * 2.5,
            epsilon = 1e-12
        );
    }
}
