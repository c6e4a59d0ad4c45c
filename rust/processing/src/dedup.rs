// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collapse repeated crossing candidates.
//!
//! Two candidates denote the same crossing iff their [`SurfaceRef`]s are
//! equal, i.e. same element reached through the same link instance (or both
//! local). The first candidate seen for a surface is kept; later ones are
//! dropped whatever their proximity.

use rustc_hash::FxHashSet;
use sleeve_core::SurfaceRef;
use sleeve_geometry::CrossingCandidate;

/// Iterator adaptor yielding the first candidate of each surface.
#[derive(Debug, Clone)]
pub struct UniqueCrossings<I> {
    inner: I,
    seen: FxHashSet<SurfaceRef>,
    raw: usize,
}

impl<I> UniqueCrossings<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            seen: FxHashSet::default(),
            raw: 0,
        }
    }

    /// Candidates pulled from the inner iterator so far.
    pub fn raw_count(&self) -> usize {
        self.raw
    }

    /// Distinct surfaces yielded so far.
    pub fn unique_count(&self) -> usize {
        self.seen.len()
    }
}

impl<I: Iterator<Item = CrossingCandidate>> Iterator for UniqueCrossings<I> {
    type Item = CrossingCandidate;

    fn next(&mut self) -> Option<CrossingCandidate> {
        loop {
            let candidate = self.inner.next()?;
            self.raw += 1;
            if self.seen.insert(candidate.surface) {
                return Some(candidate);
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

/// `.unique_crossings()` on any candidate iterator.
pub trait CrossingIterExt: Iterator<Item = CrossingCandidate> + Sized {
    fn unique_crossings(self) -> UniqueCrossings<Self> {
        UniqueCrossings::new(self)
    }
}

impl<I: Iterator<Item = CrossingCandidate>> CrossingIterExt for I {}

#[cfg(test)]
mod tests {
    use super::*;
    use sleeve_core::{Category, ElementId};

    fn hit(proximity: f64, surface: SurfaceRef) -> CrossingCandidate {
        CrossingCandidate {
            proximity,
            surface,
            category: Category::Wall,
        }
    }

    #[test]
    fn shared_key_collapses_to_one() {
        // N = 6 candidates, M = 4 of them on wall 1 -> 6 - 4 + 1 = 3
        let w1 = SurfaceRef::local(ElementId(1));
        let candidates = vec![
            hit(1.0, w1),
            hit(1.2, SurfaceRef::local(ElementId(2))),
            hit(1.1, w1),
            hit(3.0, SurfaceRef::local(ElementId(3))),
            hit(1.05, w1),
            hit(1.15, w1),
        ];
        let mut unique = candidates.into_iter().unique_crossings();
        let kept: Vec<_> = unique.by_ref().collect();

        assert_eq!(kept.len(), 3);
        assert_eq!(unique.raw_count(), 6);
        assert_eq!(unique.unique_count(), 3);
        assert_eq!(kept[0].proximity, 1.0);
    }

    #[test]
    fn first_seen_representative_wins() {
        let w1 = SurfaceRef::local(ElementId(1));
        let kept: Vec<_> = vec![hit(4.0001, w1), hit(4.0, w1)]
            .into_iter()
            .unique_crossings()
            .collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].proximity, 4.0001);
    }

    #[test]
    fn link_id_is_part_of_the_key() {
        let local = SurfaceRef::local(ElementId(7));
        let linked = SurfaceRef::linked(ElementId(100), ElementId(7));
        let other_link = SurfaceRef::linked(ElementId(101), ElementId(7));
        let count = vec![hit(1.0, local), hit(1.0, linked), hit(1.0, other_link), hit(1.1, linked)]
            .into_iter()
            .unique_crossings()
            .count();
        assert_eq!(count, 3);
    }

    #[test]
    fn empty_input() {
        assert_eq!(std::iter::empty::<CrossingCandidate>().unique_crossings().count(), 0);
    }
}
