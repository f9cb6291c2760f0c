//! Search predicates understood by every storage engine.

use roster_model::Record;

/// A single search predicate. Criteria in a list are combined with AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Case-insensitive substring match on a scalar field.
    Contains {
        /// Field to match.
        field: &'static str,
        /// Substring to look for.
        value: String,
    },
}

impl Criterion {
    /// Creates a substring criterion.
    #[must_use]
    pub fn contains(field: &'static str, value: impl Into<String>) -> Self {
        Self::Contains {
            field,
            value: value.into(),
        }
    }

    /// Returns the field this criterion reads.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Contains { field, .. } => *field,
        }
    }

    /// Evaluates the criterion against a record in memory.
    ///
    /// Absent values and unknown fields never match.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Contains { field, value } => record
                .field(field)
                .ok()
                .flatten()
                .is_some_and(|v| v.to_lowercase().contains(&value.to_lowercase())),
        }
    }
}
