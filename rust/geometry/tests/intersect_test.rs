// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BVH ray casting checked against a brute-force scan of every triangle.

use sleeve_core::{Category, CategoryFilter, ElementId, Shape, SurfaceRef};
use sleeve_geometry::{ray_triangle, Point3, Segment, SpatialQuery, SurfaceIndex, Vector3};

struct Fixture {
    shapes: Vec<(SurfaceRef, Category, Shape)>,
    index: SurfaceIndex,
}

/// Walls every 4 m along X, a floor slab and a column grid.
fn fixture() -> Fixture {
    let mut shapes = Vec::new();
    let mut id = 1;
    for i in 0..12 {
        let x = 4.0 * i as f64;
        shapes.push((
            SurfaceRef::local(ElementId(id)),
            Category::Wall,
            Shape::wall_box(Point3::new(x, -20.0, 0.0), Point3::new(x + 1.5, 20.0, 0.0), 0.3, 3.2)
                .unwrap(),
        ));
        id += 1;
    }
    shapes.push((
        SurfaceRef::local(ElementId(id)),
        Category::Floor,
        Shape::cuboid(Point3::new(-5.0, -25.0, -0.3), Point3::new(55.0, 25.0, 0.0)).unwrap(),
    ));
    id += 1;
    for i in 0..6 {
        let x = 8.0 * i as f64 + 2.0;
        shapes.push((
            SurfaceRef::local(ElementId(id)),
            Category::Column,
            Shape::cuboid(Point3::new(x, 1.0, 0.0), Point3::new(x + 0.4, 1.4, 3.2)).unwrap(),
        ));
        id += 1;
    }

    let mut builder = SurfaceIndex::builder();
    for (surface, category, shape) in &shapes {
        builder.add(*surface, *category, shape);
    }
    Fixture {
        index: builder.build(),
        shapes,
    }
}

fn segments() -> Vec<Segment> {
    // Deterministic fan of segments with varied heading, slope and length
    (0..64)
        .map(|i| {
            let a = i as f64 * 0.37;
            let origin = Point3::new(-2.0 + (i % 7) as f64, -3.0 + (i % 5) as f64, 0.4 + (i % 4) as f64 * 0.7);
            let dir = Vector3::new(a.cos().abs() + 0.1, a.sin(), ((i % 3) as f64 - 1.0) * 0.05);
            Segment::new(origin, dir, 5.0 + (i % 9) as f64 * 6.0).unwrap()
        })
        .collect()
}

fn brute_force(fixture: &Fixture, segment: &Segment, filter: CategoryFilter) -> Vec<(SurfaceRef, f64)> {
    let origin = segment.origin();
    let dir = segment.direction();
    let mut hits = Vec::new();
    for (surface, category, shape) in &fixture.shapes {
        if !filter.contains(*category) {
            continue;
        }
        for tri in shape.triangles() {
            if let Some(t) = ray_triangle(&origin, &dir, tri) {
                if segment.covers(t) {
                    hits.push((*surface, t));
                }
            }
        }
    }
    hits
}

fn sorted(mut hits: Vec<(SurfaceRef, f64)>) -> Vec<(SurfaceRef, f64)> {
    hits.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
    hits
}

#[test]
fn bvh_matches_brute_force() {
    let fixture = fixture();
    for segment in segments() {
        let expected = sorted(brute_force(&fixture, &segment, CategoryFilter::walls()));
        let actual = sorted(
            fixture
                .index
                .intersect(&segment, CategoryFilter::walls())
                .map(|c| (c.surface, c.proximity))
                .collect(),
        );
        assert_eq!(actual.len(), expected.len(), "segment {:?}", segment);
        for (a, e) in actual.iter().zip(&expected) {
            assert_eq!(a.0, e.0);
            assert!((a.1 - e.1).abs() < 1e-12);
        }
    }
}

#[test]
fn proximity_is_bounded_by_segment() {
    let fixture = fixture();
    let all = CategoryFilter::walls()
        .with(Category::Floor)
        .with(Category::Column);
    let mut total = 0;
    for segment in segments() {
        for candidate in fixture.index.intersect(&segment, all) {
            assert!(candidate.proximity >= 0.0);
            assert!(candidate.proximity <= segment.length());
            total += 1;
        }
    }
    assert!(total > 0);
}

#[test]
fn only_requested_categories_are_returned() {
    let fixture = fixture();
    for segment in segments() {
        for candidate in fixture.index.intersect(&segment, CategoryFilter::walls()) {
            assert_eq!(candidate.category, Category::Wall);
        }
        for candidate in fixture
            .index
            .intersect(&segment, CategoryFilter::only(Category::Column))
        {
            assert_eq!(candidate.category, Category::Column);
        }
    }
}
