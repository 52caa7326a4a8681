//! Facet filters.
//!
//! A [`FilterSelection`] holds the selected values for each of the four
//! filter categories. Categories compose with logical AND; values within a
//! category compose with logical OR. An empty category places no constraint.

use std::{collections::BTreeSet, fmt, str::FromStr};

use super::requirement::{Category, Complexity, Priority, Requirement, Status, UnknownValue};

/// The filterable dimensions of a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterCategory {
    /// Requirement categories (`Functional`, `UI`, ...).
    Type,
    /// Review status.
    Status,
    /// Complexity.
    Complexity,
    /// Priority.
    Priority,
}

impl FilterCategory {
    /// All categories, in the order the service expects their parameters.
    pub const ALL: [Self; 4] = [Self::Type, Self::Status, Self::Complexity, Self::Priority];

    /// The query parameter name for this category.
    #[must_use]
    pub const fn param(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Status => "status",
            Self::Complexity => "complexity",
            Self::Priority => "priority",
        }
    }

    /// The selectable values of this category, as wire labels.
    #[must_use]
    pub fn options(self) -> Vec<&'static str> {
        match self {
            Self::Type => Category::ALL.iter().map(|v| v.as_str()).collect(),
            Self::Status => Status::ALL.iter().map(|v| v.as_str()).collect(),
            Self::Complexity => Complexity::ALL.iter().map(|v| v.as_str()).collect(),
            Self::Priority => Priority::ALL.iter().map(|v| v.as_str()).collect(),
        }
    }
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}

impl FromStr for FilterCategory {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "type" | "category" | "categories" => Ok(Self::Type),
            "status" => Ok(Self::Status),
            "complexity" => Ok(Self::Complexity),
            "priority" => Ok(Self::Priority),
            _ => Err(UnknownValue {
                kind: "filter category",
                value: s.to_string(),
            }),
        }
    }
}

/// A single filter value, tagged with the category it belongs to.
///
/// Only values that are valid for their category can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    /// A requirement category.
    Type(Category),
    /// A review status.
    Status(Status),
    /// A complexity level.
    Complexity(Complexity),
    /// A priority level.
    Priority(Priority),
}

impl Facet {
    /// Parse a value within a known category.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not one of the category's options.
    pub fn parse(category: FilterCategory, value: &str) -> Result<Self, UnknownValue> {
        Ok(match category {
            FilterCategory::Type => Self::Type(value.parse()?),
            FilterCategory::Status => Self::Status(value.parse()?),
            FilterCategory::Complexity => Self::Complexity(value.parse()?),
            FilterCategory::Priority => Self::Priority(value.parse()?),
        })
    }

    /// The category this value belongs to.
    #[must_use]
    pub const fn category(self) -> FilterCategory {
        match self {
            Self::Type(_) => FilterCategory::Type,
            Self::Status(_) => FilterCategory::Status,
            Self::Complexity(_) => FilterCategory::Complexity,
            Self::Priority(_) => FilterCategory::Priority,
        }
    }

    /// The wire label of the value.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Type(v) => v.as_str(),
            Self::Status(v) => v.as_str(),
            Self::Complexity(v) => v.as_str(),
            Self::Priority(v) => v.as_str(),
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.category(), self.label())
    }
}

/// Accepts `category=value` or `category:value`.
impl FromStr for Facet {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((category, value)) = s.split_once(['=', ':']) else {
            return Err(UnknownValue {
                kind: "filter",
                value: s.to_string(),
            });
        };
        Self::parse(category.parse()?, value.trim())
    }
}

/// The selected values for each filter category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    types: BTreeSet<Category>,
    statuses: BTreeSet<Status>,
    complexities: BTreeSet<Complexity>,
    priorities: BTreeSet<Priority>,
}

impl FilterSelection {
    /// Add the value if it is not selected, remove it if it is.
    ///
    /// Returns `true` if the value is selected after the call.
    pub fn toggle(&mut self, facet: Facet) -> bool {
        fn flip<T: Ord>(set: &mut BTreeSet<T>, value: T) -> bool {
            if set.remove(&value) {
                false
            } else {
                set.insert(value)
            }
        }

        match facet {
            Facet::Type(v) => flip(&mut self.types, v),
            Facet::Status(v) => flip(&mut self.statuses, v),
            Facet::Complexity(v) => flip(&mut self.complexities, v),
            Facet::Priority(v) => flip(&mut self.priorities, v),
        }
    }

    /// Whether the value is currently selected.
    #[must_use]
    pub fn contains(&self, facet: Facet) -> bool {
        match facet {
            Facet::Type(v) => self.types.contains(&v),
            Facet::Status(v) => self.statuses.contains(&v),
            Facet::Complexity(v) => self.complexities.contains(&v),
            Facet::Priority(v) => self.priorities.contains(&v),
        }
    }

    /// Whether no value is selected in any category.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.statuses.is_empty()
            && self.complexities.is_empty()
            && self.priorities.is_empty()
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Every selected value, grouped by category.
    pub fn facets(&self) -> impl Iterator<Item = Facet> + '_ {
        self.types
            .iter()
            .copied()
            .map(Facet::Type)
            .chain(self.statuses.iter().copied().map(Facet::Status))
            .chain(self.complexities.iter().copied().map(Facet::Complexity))
            .chain(self.priorities.iter().copied().map(Facet::Priority))
    }

    /// Encode the selection as query parameters.
    ///
    /// Each selected value becomes its own `name=value` pair; categories
    /// with nothing selected produce no pairs at all.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        self.facets()
            .map(|facet| (facet.category().param(), facet.label()))
            .collect()
    }

    /// Whether a requirement satisfies the selection.
    #[must_use]
    pub fn matches(&self, requirement: &Requirement) -> bool {
        (self.types.is_empty()
            || requirement
                .categories()
                .iter()
                .any(|category| self.types.contains(category)))
            && (self.statuses.is_empty() || self.statuses.contains(&requirement.status()))
            && (self.complexities.is_empty()
                || self.complexities.contains(&requirement.complexity()))
            && (self.priorities.is_empty() || self.priorities.contains(&requirement.priority()))
    }
}

impl FromIterator<Facet> for FilterSelection {
    fn from_iter<I: IntoIterator<Item = Facet>>(iter: I) -> Self {
        let mut selection = Self::default();
        for facet in iter {
            if !selection.contains(facet) {
                selection.toggle(facet);
            }
        }
        selection
    }
}
