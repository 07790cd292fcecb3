//! Physicochemical residue categories and per-category counters.

use std::fmt;
use std::ops::{AddAssign, Index};

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Physicochemical class assigned to a residue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Hydrophobic,
    HydrophilicNeutral,
    HydrophilicPositive,
    HydrophilicNegative,
    /// Everything outside the classification alphabet
    NonStandard,
}
impl Category {
    /// Number of categories
    pub const COUNT: usize = 5;

    /// All categories, in report order
    pub const ALL: [Category; Self::COUNT] = [
        Self::Hydrophobic,
        Self::HydrophilicNeutral,
        Self::HydrophilicPositive,
        Self::HydrophilicNegative,
        Self::NonStandard,
    ];

    /// Position of the category in [`Category::ALL`]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The snake_case name used in reports
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hydrophobic => "hydrophobic",
            Self::HydrophilicNeutral => "hydrophilic_neutral",
            Self::HydrophilicPositive => "hydrophilic_positive",
            Self::HydrophilicNegative => "hydrophilic_negative",
            Self::NonStandard => "non_standard",
        }
    }
}
impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Occurrence counts for every [`Category`]
///
/// Merging is elementwise addition, so the order in which counts are merged has no
/// effect on the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryCounts {
    counts: [u64; Category::COUNT],
}
impl CategoryCounts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, category: Category) -> u64 {
        self.counts[category.index()]
    }

    pub fn add(&mut self, category: Category, n: u64) {
        self.counts[category.index()] += n;
    }

    /// Adds every count of `other` into `self`
    pub fn merge(&mut self, other: &Self) {
        self.counts
            .iter_mut()
            .zip(other.counts.iter())
            .for_each(|(a, b)| *a += b);
    }

    /// Sum over all categories
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u64)> + '_ {
        Category::ALL.iter().map(|&c| (c, self.get(c)))
    }
}
impl From<[u64; Category::COUNT]> for CategoryCounts {
    /// Builds counts in [`Category::ALL`] order
    fn from(counts: [u64; Category::COUNT]) -> Self {
        Self { counts }
    }
}
impl Index<Category> for CategoryCounts {
    type Output = u64;
    fn index(&self, category: Category) -> &u64 {
        &self.counts[category.index()]
    }
}
impl AddAssign<&CategoryCounts> for CategoryCounts {
    fn add_assign(&mut self, rhs: &CategoryCounts) {
        self.merge(rhs);
    }
}
impl<'a> std::iter::Sum<&'a CategoryCounts> for CategoryCounts {
    fn sum<I: Iterator<Item = &'a CategoryCounts>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, c| {
            acc += c;
            acc
        })
    }
}
impl Serialize for CategoryCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Category::COUNT))?;
        for (category, count) in self.iter() {
            map.serialize_entry(category.name(), &count)?;
        }
        map.end()
    }
}
