// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element categories and category filters for spatial queries.

use std::fmt;

/// Built-in element category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Category {
    Wall = 0,
    Floor = 1,
    Roof = 2,
    Ceiling = 3,
    Column = 4,
    StructuralFraming = 5,
    GenericModel = 6,
    Duct = 7,
    Pipe = 8,
}

impl Category {
    /// All categories, in discriminant order.
    pub const ALL: [Category; 9] = [
        Category::Wall,
        Category::Floor,
        Category::Roof,
        Category::Ceiling,
        Category::Column,
        Category::StructuralFraming,
        Category::GenericModel,
        Category::Duct,
        Category::Pipe,
    ];

    /// Returns the category name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Wall => "Wall",
            Category::Floor => "Floor",
            Category::Roof => "Roof",
            Category::Ceiling => "Ceiling",
            Category::Column => "Column",
            Category::StructuralFraming => "StructuralFraming",
            Category::GenericModel => "GenericModel",
            Category::Duct => "Duct",
            Category::Pipe => "Pipe",
        }
    }

    #[inline]
    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of categories, stored as a bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CategoryFilter {
    mask: u16,
}

impl CategoryFilter {
    /// Filter that accepts nothing.
    pub const fn none() -> Self {
        Self { mask: 0 }
    }

    /// Filter that accepts a single category.
    pub fn only(category: Category) -> Self {
        Self {
            mask: category.bit(),
        }
    }

    /// Filter for walls, the default target of opening placement.
    pub fn walls() -> Self {
        Self::only(Category::Wall)
    }

    /// Returns a copy that also accepts `category`.
    pub fn with(mut self, category: Category) -> Self {
        self.mask |= category.bit();
        self
    }

    /// Whether the filter accepts `category`.
    #[inline]
    pub fn contains(&self, category: Category) -> bool {
        self.mask & category.bit() != 0
    }

    /// Whether the filter accepts nothing.
    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    /// Iterates the accepted categories.
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Category> for CategoryFilter {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), |f, c| f.with(c))
    }
}
