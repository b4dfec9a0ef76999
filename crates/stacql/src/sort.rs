//! Sort key for the `sortby` member of a filter document.
//!
//! A query carries at most one [`SortBy`]; setting another replaces it.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Returns the wire name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One `sortby` entry: a property name and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    /// The property to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: Dir,
}

impl SortBy {
    /// Creates an ascending sort on the given property.
    pub fn asc(field: impl Into<String>) -> Self {
        SortBy {
            field: field.into(),
            direction: Dir::Asc,
        }
    }

    /// Creates a descending sort on the given property.
    pub fn desc(field: impl Into<String>) -> Self {
        SortBy {
            field: field.into(),
            direction: Dir::Desc,
        }
    }
}
