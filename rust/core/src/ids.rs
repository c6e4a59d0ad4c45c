// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element identity.
//!
//! Element ids are opaque integers scoped to one document. An element seen
//! through a link instance is only unique as the pair (link instance id,
//! element id), which is what [`SurfaceRef`] captures.

use std::fmt;

/// Opaque identifier of an element inside one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ElementId(pub u32);

impl ElementId {
    /// Returns the raw integer value.
    #[inline]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for ElementId {
    fn from(value: u32) -> Self {
        ElementId(value)
    }
}

/// Reference to a surface-owning element as seen from the active document.
///
/// `link` is the id of the link instance the element was reached through, or
/// `None` for elements of the active document itself. Two references denote
/// the same physical element iff both fields are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceRef {
    pub link: Option<ElementId>,
    pub element: ElementId,
}

impl SurfaceRef {
    /// Reference to an element of the active document.
    pub fn local(element: ElementId) -> Self {
        Self { link: None, element }
    }

    /// Reference to an element reached through a link instance.
    pub fn linked(link: ElementId, element: ElementId) -> Self {
        Self {
            link: Some(link),
            element,
        }
    }

    /// Whether the element lives in a linked document.
    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }
}

impl fmt::Display for SurfaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.link {
            Some(link) => write!(f, "{}@{}", self.element, link),
            None => write!(f, "{}", self.element),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn surface_ref_identity_includes_link() {
        let local = SurfaceRef::local(ElementId(7));
        let linked = SurfaceRef::linked(ElementId(100), ElementId(7));

        assert_ne!(local, linked);
        assert_eq!(local, SurfaceRef::local(ElementId(7)));

        let set: FxHashSet<SurfaceRef> = [local, linked, SurfaceRef::local(ElementId(7))]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_formats() {
        assert_eq!(ElementId(42).to_string(), "#42");
        assert_eq!(SurfaceRef::local(ElementId(3)).to_string(), "#3");
        assert_eq!(
            SurfaceRef::linked(ElementId(9), ElementId(3)).to_string(),
            "#3@#9"
        );
    }
}
